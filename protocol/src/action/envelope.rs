//! # Action Envelope
//!
//! Wire-compatible protobuf definitions of the IoTeX action and the helpers
//! that hash, sign-check and hex-encode it.
//!
//! ```text
//! Action
//! ├── core: ActionCore          ← hash256b(encode(core)) is what gets signed
//! │   ├── version, nonce, gas_limit, gas_price, chain_id
//! │   └── payload (oneof)       ← exactly one variant
//! ├── sender_pub_key            ← 65-byte uncompressed secp256k1
//! └── signature                 ← 65-byte r || s || v
//! ```
//!
//! The action hash, used as the transaction id, is
//! `hash256b(encode(action))` over the signed envelope.

use std::fmt;
use std::str::FromStr;

use prost::Message;

use super::CodecError;
use crate::config::HASH_LENGTH;
use crate::crypto::{hash256b, PublicKey, Signature};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct Action {
    #[prost(message, optional, tag = "1")]
    pub core: Option<ActionCore>,
    #[prost(bytes = "vec", tag = "2")]
    pub sender_pub_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ActionCore {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(uint64, tag = "3")]
    pub gas_limit: u64,
    #[prost(string, tag = "4")]
    pub gas_price: String,
    #[prost(uint32, tag = "5")]
    pub chain_id: u32,
    #[prost(oneof = "Payload", tags = "10, 12, 30, 31, 32, 40, 41, 42, 43, 47")]
    pub payload: Option<Payload>,
}

/// The one populated action body.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum Payload {
    #[prost(message, tag = "10")]
    Transfer(Transfer),
    #[prost(message, tag = "12")]
    Execution(Execution),
    #[prost(message, tag = "30")]
    DepositToRewardingFund(DepositToRewardingFund),
    #[prost(message, tag = "31")]
    ClaimFromRewardingFund(ClaimFromRewardingFund),
    #[prost(message, tag = "32")]
    GrantReward(GrantReward),
    #[prost(message, tag = "40")]
    StakeCreate(StakeCreate),
    #[prost(message, tag = "41")]
    StakeUnstake(StakeReclaim),
    #[prost(message, tag = "42")]
    StakeWithdraw(StakeReclaim),
    #[prost(message, tag = "43")]
    StakeAddDeposit(StakeAddDeposit),
    #[prost(message, tag = "47")]
    CandidateRegister(CandidateRegister),
}

impl Payload {
    /// Short variant name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Payload::Transfer(_) => "transfer",
            Payload::Execution(_) => "execution",
            Payload::DepositToRewardingFund(_) => "depositToRewardingFund",
            Payload::ClaimFromRewardingFund(_) => "claimFromRewardingFund",
            Payload::GrantReward(_) => "grantReward",
            Payload::StakeCreate(_) => "stakeCreate",
            Payload::StakeUnstake(_) => "stakeUnstake",
            Payload::StakeWithdraw(_) => "stakeWithdraw",
            Payload::StakeAddDeposit(_) => "stakeAddDeposit",
            Payload::CandidateRegister(_) => "candidateRegister",
        }
    }
}

// ---------------------------------------------------------------------------
// Payload bodies
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct Transfer {
    #[prost(string, tag = "1")]
    pub amount: String,
    #[prost(string, tag = "2")]
    pub recipient: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Execution {
    #[prost(string, tag = "1")]
    pub amount: String,
    /// Empty for contract creation.
    #[prost(string, tag = "2")]
    pub contract: String,
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DepositToRewardingFund {
    #[prost(string, tag = "1")]
    pub amount: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClaimFromRewardingFund {
    #[prost(string, tag = "1")]
    pub amount: String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GrantReward {
    #[prost(int32, tag = "1")]
    pub reward_type: i32,
    #[prost(uint64, tag = "2")]
    pub height: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct StakeCreate {
    #[prost(string, tag = "1")]
    pub candidate_name: String,
    #[prost(string, tag = "2")]
    pub staked_amount: String,
    #[prost(uint32, tag = "3")]
    pub staked_duration: u32,
    #[prost(bool, tag = "4")]
    pub auto_stake: bool,
    #[prost(bytes = "vec", tag = "5")]
    pub payload: Vec<u8>,
}

/// Body shared by unstake and withdraw.
#[derive(Clone, PartialEq, Message)]
pub struct StakeReclaim {
    #[prost(uint64, tag = "1")]
    pub bucket_index: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StakeAddDeposit {
    #[prost(uint64, tag = "1")]
    pub bucket_index: u64,
    #[prost(string, tag = "2")]
    pub amount: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CandidateBasicInfo {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub operator_address: String,
    #[prost(string, tag = "3")]
    pub reward_address: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CandidateRegister {
    #[prost(message, optional, tag = "1")]
    pub candidate: Option<CandidateBasicInfo>,
    #[prost(string, tag = "2")]
    pub staked_amount: String,
    #[prost(uint32, tag = "3")]
    pub staked_duration: u32,
    #[prost(bool, tag = "4")]
    pub auto_stake: bool,
    #[prost(string, tag = "5")]
    pub owner_address: String,
    #[prost(bytes = "vec", tag = "6")]
    pub payload: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Unsigned transport form
// ---------------------------------------------------------------------------

/// The unsigned transaction handed to an external signer.
///
/// The sender is carried next to the encoded core, never inside it, so the
/// bytes that get hashed and signed are exactly the action body.
#[derive(Clone, PartialEq, Message)]
pub struct UnsignedAction {
    #[prost(bytes = "vec", tag = "1")]
    pub core: Vec<u8>,
    #[prost(string, tag = "2")]
    pub sender: String,
}

impl UnsignedAction {
    pub fn new(core: &ActionCore, sender: &Address) -> Self {
        Self {
            core: core.encode_to_vec(),
            sender: sender.to_string(),
        }
    }

    pub fn decode_core(&self) -> Result<ActionCore, CodecError> {
        Ok(ActionCore::decode(self.core.as_slice())?)
    }

    pub fn sender_address(&self) -> Result<Address, CodecError> {
        super::parse_address(&self.sender)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.encode_to_vec())
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        Ok(Self::decode(decode_hex(s)?.as_slice())?)
    }
}

// ---------------------------------------------------------------------------
// Action helpers
// ---------------------------------------------------------------------------

impl ActionCore {
    /// The 32-byte digest a sender signs.
    pub fn signing_digest(&self) -> [u8; HASH_LENGTH] {
        hash256b(&self.encode_to_vec())
    }

    pub fn payload(&self) -> Result<&Payload, CodecError> {
        self.payload.as_ref().ok_or(CodecError::MissingPayload)
    }
}

impl Action {
    pub fn core(&self) -> Result<&ActionCore, CodecError> {
        self.core.as_ref().ok_or(CodecError::MissingCore)
    }

    /// Content hash of the full envelope; the transaction id.
    pub fn hash(&self) -> ActionHash {
        ActionHash(hash256b(&self.encode_to_vec()))
    }

    pub fn sender_public_key(&self) -> Result<PublicKey, CodecError> {
        Ok(PublicKey::from_bytes(&self.sender_pub_key)?)
    }

    /// The caller, derived from the embedded public key.
    pub fn sender_address(&self) -> Result<Address, CodecError> {
        Ok(Address::from_public_key(&self.sender_public_key()?))
    }

    /// Check the embedded signature against the embedded key.
    pub fn verify_signature(&self) -> Result<PublicKey, CodecError> {
        let signer = self.sender_public_key()?;
        let digest = self.core()?.signing_digest();
        let signature = Signature::from_recoverable(&self.signature)?;
        if signature.verify(&digest, &signer) {
            Ok(signer)
        } else {
            Err(CodecError::PublicKey(crate::crypto::KeyError::SignatureMismatch))
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.encode_to_vec())
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        Ok(Self::decode(decode_hex(s)?.as_slice())?)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

// ---------------------------------------------------------------------------
// ActionHash
// ---------------------------------------------------------------------------

/// 32-byte action hash, displayed as lowercase hex without prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionHash(pub [u8; HASH_LENGTH]);

impl ActionHash {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; HASH_LENGTH] = bytes
            .try_into()
            .map_err(|_| CodecError::InvalidActionHash(hex::encode(bytes)))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ActionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ActionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionHash({self})")
    }
}

impl FromStr for ActionHash {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s).map_err(|_| CodecError::InvalidActionHash(s.to_string()))?;
        Self::from_slice(&bytes).map_err(|_| CodecError::InvalidActionHash(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn transfer_core() -> ActionCore {
        ActionCore {
            version: 1,
            nonce: 10,
            gas_limit: 20010,
            gas_price: "11000000000000000000".into(),
            chain_id: 1,
            payload: Some(Payload::Transfer(Transfer {
                amount: "1010000000000000000000".into(),
                recipient: Address::from_bytes([2u8; 20]).to_string(),
                payload: Vec::new(),
            })),
        }
    }

    fn signed(core: ActionCore, key: &PrivateKey) -> Action {
        let sig = key.sign(&core.signing_digest());
        Action {
            core: Some(core),
            sender_pub_key: key.public_key().to_uncompressed().to_vec(),
            signature: sig.as_bytes().to_vec(),
        }
    }

    #[test]
    fn hex_roundtrip_preserves_hash() {
        let key = PrivateKey::generate();
        let action = signed(transfer_core(), &key);
        let decoded = Action::from_hex(&action.to_hex()).unwrap();
        assert_eq!(decoded, action);
        assert_eq!(decoded.hash(), action.hash());
    }

    #[test]
    fn hash_depends_on_signature() {
        let key = PrivateKey::generate();
        let a = signed(transfer_core(), &key);
        let mut b = a.clone();
        b.signature[0] ^= 1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn verify_signature_accepts_valid_and_rejects_tampered() {
        let key = PrivateKey::generate();
        let action = signed(transfer_core(), &key);
        assert_eq!(action.verify_signature().unwrap(), key.public_key());

        let mut tampered = action.clone();
        if let Some(core) = tampered.core.as_mut() {
            core.nonce += 1;
        }
        assert!(tampered.verify_signature().is_err());
    }

    #[test]
    fn sender_address_comes_from_embedded_key() {
        let key = PrivateKey::generate();
        let action = signed(transfer_core(), &key);
        assert_eq!(
            action.sender_address().unwrap(),
            Address::from_public_key(&key.public_key())
        );
    }

    #[test]
    fn unsigned_action_keeps_sender_out_of_core() {
        let core = transfer_core();
        let sender = Address::from_bytes([1u8; 20]);
        let unsigned = UnsignedAction::new(&core, &sender);
        let decoded = UnsignedAction::from_hex(&unsigned.to_hex()).unwrap();
        assert_eq!(decoded.decode_core().unwrap(), core);
        assert_eq!(decoded.sender_address().unwrap(), sender);
        assert_eq!(decoded.core, core.encode_to_vec());
    }

    #[test]
    fn missing_core_is_reported() {
        let action = Action::default();
        assert_eq!(action.core(), Err(CodecError::MissingCore));
    }

    #[test]
    fn action_hash_parses_with_or_without_prefix() {
        let hash = ActionHash([0xcd; 32]);
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<ActionHash>().unwrap(), hash);
        assert_eq!(format!("0x{text}").parse::<ActionHash>().unwrap(), hash);
        assert!("abcd".parse::<ActionHash>().is_err());
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(matches!(
            Action::from_hex("not-hex"),
            Err(CodecError::InvalidHex(_))
        ));
    }
}
