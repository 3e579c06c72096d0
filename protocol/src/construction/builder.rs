//! Payloads: action construction via the builder pattern.
//!
//! The [`ActionBuilder`] produces an unsigned [`ActionCore`]. Signing is
//! left to the external signer; the gateway only hands out the digest.

use num_bigint::BigUint;

use super::derive::public_key;
use super::types::{PayloadsRequest, PayloadsResponse, SigningPayload};
use super::validate::check_transfer_operations;
use super::ConstructionError;
use crate::action::{ActionCore, Payload, Transfer, UnsignedAction};
use crate::config::{ACTION_VERSION, SIGNATURE_TYPE};
use crate::identity::Address;
use crate::ledger::{AccountIdentifier, Currency};

// ---------------------------------------------------------------------------
// ActionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`ActionCore`] values.
///
/// ```
/// use iotex_rosetta::construction::ActionBuilder;
/// use iotex_rosetta::identity::Address;
///
/// let core = ActionBuilder::new(1)
///     .nonce(10)
///     .gas_limit(10_000)
///     .gas_price(1_000_000_000_000)
///     .transfer(&Address::from_bytes([7; 20]), &1_000u32.into())
///     .build();
/// assert_eq!(core.gas_price, "1000000000000");
/// ```
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    chain_id: u32,
    nonce: u64,
    gas_limit: u64,
    gas_price: u64,
    payload: Option<Payload>,
}

impl ActionBuilder {
    pub fn new(chain_id: u32) -> Self {
        Self {
            chain_id,
            nonce: 0,
            gas_limit: 0,
            gas_price: 0,
            payload: None,
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Gas price in the smallest currency unit.
    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Make the action a native transfer with an empty payload.
    pub fn transfer(mut self, recipient: &Address, amount: &BigUint) -> Self {
        self.payload = Some(Payload::Transfer(Transfer {
            amount: amount.to_string(),
            recipient: recipient.to_string(),
            payload: Vec::new(),
        }));
        self
    }

    pub fn build(self) -> ActionCore {
        ActionCore {
            version: ACTION_VERSION,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price.to_string(),
            chain_id: self.chain_id,
            payload: self.payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads stage
// ---------------------------------------------------------------------------

pub fn payloads(
    req: &PayloadsRequest,
    currency: &Currency,
    chain_id: u32,
) -> Result<PayloadsResponse, ConstructionError> {
    let transfer = check_transfer_operations(&req.operations, currency)?;

    if let Some(key) = req.public_keys.first() {
        let signer = Address::from_public_key(&public_key(key)?);
        if signer != transfer.sender {
            return Err(ConstructionError::InvalidInput(format!(
                "public key belongs to {signer}, not sender {}",
                transfer.sender
            )));
        }
    }

    let core = ActionBuilder::new(chain_id)
        .nonce(req.metadata.nonce)
        .gas_limit(req.metadata.gas_limit)
        .gas_price(req.metadata.gas_price)
        .transfer(&transfer.recipient, &transfer.amount)
        .build();

    Ok(PayloadsResponse {
        unsigned_transaction: UnsignedAction::new(&core, &transfer.sender).to_hex(),
        payloads: vec![SigningPayload {
            account_identifier: AccountIdentifier::new(transfer.sender),
            hex_bytes: hex::encode(core.signing_digest()),
            signature_type: SIGNATURE_TYPE.to_string(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::types::{ConstructionMetadata, RosettaPublicKey};
    use crate::construction::validate::transfer_operations;
    use crate::crypto::PrivateKey;

    fn currency() -> Currency {
        Currency::new("IOTX", 18)
    }

    fn request(sender: Address) -> PayloadsRequest {
        PayloadsRequest {
            operations: transfer_operations(
                &sender,
                &Address::from_bytes([2; 20]),
                &BigUint::from(500u32),
                &currency(),
            ),
            metadata: ConstructionMetadata {
                nonce: 4,
                gas_limit: 10_000,
                gas_price: 1_000,
            },
            public_keys: Vec::new(),
        }
    }

    #[test]
    fn builder_sets_version_and_chain() {
        let core = ActionBuilder::new(2).nonce(1).build();
        assert_eq!(core.version, ACTION_VERSION);
        assert_eq!(core.chain_id, 2);
        assert_eq!(core.gas_price, "0");
        assert!(core.payload.is_none());
    }

    #[test]
    fn builder_is_deterministic() {
        let make = || {
            ActionBuilder::new(1)
                .nonce(3)
                .gas_limit(7)
                .gas_price(9)
                .transfer(&Address::from_bytes([4; 20]), &BigUint::from(11u32))
                .build()
        };
        assert_eq!(make().signing_digest(), make().signing_digest());
    }

    #[test]
    fn payload_digest_matches_unsigned_core() {
        let sender = Address::from_bytes([1; 20]);
        let resp = payloads(&request(sender), &currency(), 1).unwrap();
        let unsigned = UnsignedAction::from_hex(&resp.unsigned_transaction).unwrap();
        let core = unsigned.decode_core().unwrap();

        assert_eq!(unsigned.sender_address().unwrap(), sender);
        assert_eq!(core.nonce, 4);
        assert_eq!(core.gas_limit, 10_000);
        assert_eq!(core.gas_price, "1000");
        assert_eq!(resp.payloads.len(), 1);
        assert_eq!(resp.payloads[0].hex_bytes, hex::encode(core.signing_digest()));
        assert_eq!(resp.payloads[0].signature_type, "ecdsa_recovery");
        assert_eq!(resp.payloads[0].account_identifier.address, sender.to_string());
    }

    #[test]
    fn public_key_must_match_sender() {
        let key = PrivateKey::generate();
        let sender = Address::from_public_key(&key.public_key());
        let mut req = request(sender);
        req.public_keys = vec![RosettaPublicKey {
            hex_bytes: hex::encode(key.public_key().to_compressed()),
            curve_type: "secp256k1".into(),
        }];
        assert!(payloads(&req, &currency(), 1).is_ok());

        let other = PrivateKey::generate();
        req.public_keys[0].hex_bytes = hex::encode(other.public_key().to_compressed());
        assert!(matches!(
            payloads(&req, &currency(), 1),
            Err(ConstructionError::InvalidInput(_))
        ));
    }

    #[test]
    fn unbalanced_operations_are_rejected() {
        let mut req = request(Address::from_bytes([1; 20]));
        req.operations[1].amount.value += num_bigint::BigInt::from(1);
        assert!(matches!(
            payloads(&req, &currency(), 1),
            Err(ConstructionError::Check(_))
        ));
    }
}
