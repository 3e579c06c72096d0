//! Parse: turn an unsigned or signed transaction back into operations.
//!
//! Signed input has its signature checked against the embedded key before
//! anything is reported; the signer is derived from that key, not trusted
//! from the caller.

use super::types::{ConstructionMetadata, ParseRequest, ParseResponse};
use super::validate::transfer_operations;
use super::ConstructionError;
use crate::action::{
    parse_address, parse_amount, Action, ActionCore, CodecError, Payload, UnsignedAction,
};
use crate::crypto::KeyError;
use crate::identity::Address;
use crate::ledger::{AccountIdentifier, Currency, Operation};

pub fn parse(req: &ParseRequest, currency: &Currency) -> Result<ParseResponse, ConstructionError> {
    let (core, sender, signers) = if req.signed {
        let action = Action::from_hex(&req.transaction).map_err(ConstructionError::Parse)?;
        let signer = action.verify_signature().map_err(signature_error)?;
        let sender = Address::from_public_key(&signer);
        let core = action.core.ok_or(ConstructionError::Parse(CodecError::MissingCore))?;
        (core, sender, vec![AccountIdentifier::new(sender)])
    } else {
        let unsigned =
            UnsignedAction::from_hex(&req.transaction).map_err(ConstructionError::Parse)?;
        let core = unsigned.decode_core().map_err(ConstructionError::Parse)?;
        let sender = unsigned.sender_address().map_err(ConstructionError::Parse)?;
        (core, sender, Vec::new())
    };

    let operations = transfer_from_core(&core, &sender, currency)?;
    let gas_price = core
        .gas_price
        .parse::<u64>()
        .map_err(|_| ConstructionError::InvalidGasPrice(core.gas_price.clone()))?;

    Ok(ParseResponse {
        operations,
        account_identifier_signers: signers,
        metadata: ConstructionMetadata {
            nonce: core.nonce,
            gas_limit: core.gas_limit,
            gas_price,
        },
    })
}

fn transfer_from_core(
    core: &ActionCore,
    sender: &Address,
    currency: &Currency,
) -> Result<Vec<Operation>, ConstructionError> {
    let transfer = match core.payload() {
        Ok(Payload::Transfer(transfer)) => transfer,
        Ok(other) => {
            return Err(ConstructionError::InvalidInput(format!(
                "{} actions are not constructed here",
                other.name()
            )))
        }
        Err(err) => return Err(ConstructionError::Parse(err)),
    };
    let recipient = parse_address(&transfer.recipient).map_err(ConstructionError::Parse)?;
    let amount = parse_amount(&transfer.amount).map_err(ConstructionError::Parse)?;
    Ok(transfer_operations(sender, &recipient, &amount, currency))
}

/// Split signature failures from malformed keys and envelopes.
fn signature_error(err: CodecError) -> ConstructionError {
    match err {
        CodecError::PublicKey(key @ KeyError::InvalidPublicKey(_)) => {
            ConstructionError::InvalidPublicKey(key)
        }
        CodecError::PublicKey(key) => ConstructionError::InvalidSignature(key.to_string()),
        other => ConstructionError::Parse(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::builder::ActionBuilder;
    use crate::crypto::PrivateKey;
    use crate::ledger::OperationType;
    use num_bigint::{BigInt, BigUint};

    fn currency() -> Currency {
        Currency::new("IOTX", 18)
    }

    fn core() -> ActionCore {
        ActionBuilder::new(1)
            .nonce(10)
            .gas_limit(20010)
            .gas_price(11_000_000_000_000_000_000)
            .transfer(
                &Address::from_bytes([2; 20]),
                &"1010000000000000000000".parse::<BigUint>().unwrap(),
            )
            .build()
    }

    fn signed(key: &PrivateKey, core: ActionCore) -> Action {
        let signature = key.sign(&core.signing_digest());
        Action {
            core: Some(core),
            sender_pub_key: key.public_key().to_uncompressed().to_vec(),
            signature: signature.as_bytes().to_vec(),
        }
    }

    #[test]
    fn unsigned_transfer_parses() {
        let sender = Address::from_bytes([1; 20]);
        let req = ParseRequest {
            signed: false,
            transaction: UnsignedAction::new(&core(), &sender).to_hex(),
        };
        let resp = parse(&req, &currency()).unwrap();

        assert!(resp.account_identifier_signers.is_empty());
        assert_eq!(
            resp.metadata,
            ConstructionMetadata {
                nonce: 10,
                gas_limit: 20010,
                gas_price: 11_000_000_000_000_000_000,
            }
        );
        let ops = &resp.operations;
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.kind == OperationType::NativeTransfer));
        assert!(ops.iter().all(|op| op.status.is_none()));
        assert_eq!(ops[0].account.address, sender.to_string());
        assert_eq!(
            ops[0].amount.value,
            "-1010000000000000000000".parse::<BigInt>().unwrap()
        );
        assert_eq!(ops[1].related_operations[0].index, 0);
    }

    #[test]
    fn signed_transfer_reports_signer() {
        let key = PrivateKey::generate();
        let sender = Address::from_public_key(&key.public_key());
        let req = ParseRequest {
            signed: true,
            transaction: signed(&key, core()).to_hex(),
        };
        let resp = parse(&req, &currency()).unwrap();
        assert_eq!(
            resp.account_identifier_signers,
            vec![AccountIdentifier::new(sender)]
        );
        assert_eq!(resp.operations[0].account.address, sender.to_string());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let key = PrivateKey::generate();
        let mut action = signed(&key, core());
        if let Some(core) = action.core.as_mut() {
            core.nonce = 11;
        }
        let req = ParseRequest {
            signed: true,
            transaction: action.to_hex(),
        };
        assert!(matches!(
            parse(&req, &currency()),
            Err(ConstructionError::InvalidSignature(_))
        ));
    }

    #[test]
    fn bad_embedded_key_is_invalid_public_key() {
        let key = PrivateKey::generate();
        let mut action = signed(&key, core());
        action.sender_pub_key = vec![4; 10];
        let req = ParseRequest {
            signed: true,
            transaction: action.to_hex(),
        };
        assert!(matches!(
            parse(&req, &currency()),
            Err(ConstructionError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn non_transfer_is_rejected() {
        let mut core = core();
        core.payload = Some(Payload::GrantReward(Default::default()));
        let req = ParseRequest {
            signed: false,
            transaction: UnsignedAction::new(&core, &Address::from_bytes([1; 20])).to_hex(),
        };
        assert!(matches!(
            parse(&req, &currency()),
            Err(ConstructionError::InvalidInput(_))
        ));
    }

    #[test]
    fn garbage_is_parse_error() {
        let req = ParseRequest {
            signed: true,
            transaction: "0xzz".into(),
        };
        assert!(matches!(
            parse(&req, &currency()),
            Err(ConstructionError::Parse(_))
        ));
    }
}
