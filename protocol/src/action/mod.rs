//! # Actions
//!
//! The chain-native side of the ledger: the protobuf action envelope,
//! execution receipts and the two historical transfer-log shapes.
//!
//! Everything in here is data as the node reports it. Interpretation into
//! balance movements happens in [`crate::ledger`].

pub mod envelope;
pub mod log;
pub mod receipt;

use thiserror::Error;

use crate::crypto::KeyError;
use crate::identity::AddressError;

pub use envelope::{
    Action, ActionCore, ActionHash, CandidateBasicInfo, CandidateRegister,
    ClaimFromRewardingFund, DepositToRewardingFund, Execution, GrantReward, Payload,
    StakeAddDeposit, StakeCreate, StakeReclaim, Transfer, UnsignedAction,
};
pub use log::{
    BlockTransferLogs, ImplicitTransfer, ImplicitTransferLog, TransactionLog,
    TransactionLogTransfer, TransferLogEntry,
};
pub use receipt::Receipt;

/// Errors raised while decoding chain data.
///
/// Any of these inside a fetched block means the node handed us something
/// we cannot interpret, and the whole block decode is aborted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("protobuf decode failed: {0}")]
    Decode(String),

    #[error("action has no core")]
    MissingCore,

    #[error("action has no payload")]
    MissingPayload,

    #[error("invalid sender public key: {0}")]
    PublicKey(#[from] KeyError),

    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        source: AddressError,
    },

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid action hash '{0}'")]
    InvalidActionHash(String),

    #[error("unknown transfer log topic {0}")]
    UnknownTopic(String),

    #[error("unknown transaction log type {0}")]
    UnknownLogType(i32),
}

impl From<prost::DecodeError> for CodecError {
    fn from(err: prost::DecodeError) -> Self {
        CodecError::Decode(err.to_string())
    }
}

/// Parse an address field, keeping the offending text in the error.
pub(crate) fn parse_address(text: &str) -> Result<crate::identity::Address, CodecError> {
    crate::identity::Address::parse(text).map_err(|source| CodecError::Address {
        address: text.to_string(),
        source,
    })
}

/// Parse a non-negative decimal amount string.
pub(crate) fn parse_amount(text: &str) -> Result<num_bigint::BigUint, CodecError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidAmount(text.to_string()));
    }
    text.parse()
        .map_err(|_| CodecError::InvalidAmount(text.to_string()))
}
