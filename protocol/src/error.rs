//! # Rosetta Error Catalog
//!
//! Every failure the gateway reports maps onto one numbered entry of a
//! fixed catalog. Codes are stable across releases; new entries are only
//! ever appended. `/network/options` publishes the whole list.
//!
//! | Range | Concern |
//! |-------|---------|
//! | 1–18  | network identifier, data and account lookups |
//! | 19–28 | construction |
//! | 29–31 | keys, signatures, node reachability |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::client::ClientError;
use crate::construction::ConstructionError;
use crate::identity::AddressError;
use crate::ledger::{BalanceError, LedgerError};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnableToGetChainId,
    InvalidBlockchain,
    InvalidSubnetwork,
    InvalidNetwork,
    MissingNetworkIdentifier,
    UnableToGetLatestBlock,
    UnableToGetGenesisBlock,
    UnableToGetAccount,
    MustQueryByIndex,
    InvalidAccountAddress,
    MustSpecifySubAccount,
    UnableToGetBlock,
    NotImplemented,
    UnableToGetTransactions,
    UnableToSubmitTransaction,
    UnableToGetNextNonce,
    MalformedValue,
    UnableToGetNodeStatus,
    InvalidInputParam,
    UnsupportedPublicKeyType,
    UnableToParseTransaction,
    InvalidGasPrice,
    UnmarshalProto,
    ConstructionCheck,
    ServerError,
    ExceededFee,
    UnableToEstimateGas,
    UnableToGetSuggestGas,
    InvalidPublicKey,
    InvalidSignature,
    UnableToReachNode,
}

impl ErrorCode {
    /// The full catalog in code order.
    pub const ALL: [ErrorCode; 31] = [
        ErrorCode::UnableToGetChainId,
        ErrorCode::InvalidBlockchain,
        ErrorCode::InvalidSubnetwork,
        ErrorCode::InvalidNetwork,
        ErrorCode::MissingNetworkIdentifier,
        ErrorCode::UnableToGetLatestBlock,
        ErrorCode::UnableToGetGenesisBlock,
        ErrorCode::UnableToGetAccount,
        ErrorCode::MustQueryByIndex,
        ErrorCode::InvalidAccountAddress,
        ErrorCode::MustSpecifySubAccount,
        ErrorCode::UnableToGetBlock,
        ErrorCode::NotImplemented,
        ErrorCode::UnableToGetTransactions,
        ErrorCode::UnableToSubmitTransaction,
        ErrorCode::UnableToGetNextNonce,
        ErrorCode::MalformedValue,
        ErrorCode::UnableToGetNodeStatus,
        ErrorCode::InvalidInputParam,
        ErrorCode::UnsupportedPublicKeyType,
        ErrorCode::UnableToParseTransaction,
        ErrorCode::InvalidGasPrice,
        ErrorCode::UnmarshalProto,
        ErrorCode::ConstructionCheck,
        ErrorCode::ServerError,
        ErrorCode::ExceededFee,
        ErrorCode::UnableToEstimateGas,
        ErrorCode::UnableToGetSuggestGas,
        ErrorCode::InvalidPublicKey,
        ErrorCode::InvalidSignature,
        ErrorCode::UnableToReachNode,
    ];

    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::UnableToGetChainId => 1,
            ErrorCode::InvalidBlockchain => 2,
            ErrorCode::InvalidSubnetwork => 3,
            ErrorCode::InvalidNetwork => 4,
            ErrorCode::MissingNetworkIdentifier => 5,
            ErrorCode::UnableToGetLatestBlock => 6,
            ErrorCode::UnableToGetGenesisBlock => 7,
            ErrorCode::UnableToGetAccount => 8,
            ErrorCode::MustQueryByIndex => 9,
            ErrorCode::InvalidAccountAddress => 10,
            ErrorCode::MustSpecifySubAccount => 11,
            ErrorCode::UnableToGetBlock => 12,
            ErrorCode::NotImplemented => 13,
            ErrorCode::UnableToGetTransactions => 14,
            ErrorCode::UnableToSubmitTransaction => 15,
            ErrorCode::UnableToGetNextNonce => 16,
            ErrorCode::MalformedValue => 17,
            ErrorCode::UnableToGetNodeStatus => 18,
            ErrorCode::InvalidInputParam => 19,
            ErrorCode::UnsupportedPublicKeyType => 20,
            ErrorCode::UnableToParseTransaction => 21,
            ErrorCode::InvalidGasPrice => 22,
            ErrorCode::UnmarshalProto => 23,
            ErrorCode::ConstructionCheck => 24,
            ErrorCode::ServerError => 25,
            ErrorCode::ExceededFee => 26,
            ErrorCode::UnableToEstimateGas => 27,
            ErrorCode::UnableToGetSuggestGas => 28,
            ErrorCode::InvalidPublicKey => 29,
            ErrorCode::InvalidSignature => 30,
            ErrorCode::UnableToReachNode => 31,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::UnableToGetChainId => "unable to get chain ID",
            ErrorCode::InvalidBlockchain => "invalid blockchain specified in network identifier",
            ErrorCode::InvalidSubnetwork => "invalid sub-network identifier",
            ErrorCode::InvalidNetwork => "invalid network specified in network identifier",
            ErrorCode::MissingNetworkIdentifier => "network identifier is missing",
            ErrorCode::UnableToGetLatestBlock => "unable to get latest block",
            ErrorCode::UnableToGetGenesisBlock => "unable to get genesis block",
            ErrorCode::UnableToGetAccount => "unable to get account",
            ErrorCode::MustQueryByIndex => "blocks must be queried by index and not hash",
            ErrorCode::InvalidAccountAddress => "invalid account address",
            ErrorCode::MustSpecifySubAccount => "a valid subaccount must be specified",
            ErrorCode::UnableToGetBlock => "unable to get block",
            ErrorCode::NotImplemented => "operation not implemented",
            ErrorCode::UnableToGetTransactions => "unable to get transactions",
            ErrorCode::UnableToSubmitTransaction => "unable to submit transaction",
            ErrorCode::UnableToGetNextNonce => "unable to get next nonce",
            ErrorCode::MalformedValue => "malformed value",
            ErrorCode::UnableToGetNodeStatus => "unable to get node status",
            ErrorCode::InvalidInputParam => "invalid input param",
            ErrorCode::UnsupportedPublicKeyType => "unsupported public key type",
            ErrorCode::UnableToParseTransaction => "unable to parse transaction",
            ErrorCode::InvalidGasPrice => "invalid gas price",
            ErrorCode::UnmarshalProto => "proto unmarshal error",
            ErrorCode::ConstructionCheck => "operation construction check error",
            ErrorCode::ServerError => "internal error",
            ErrorCode::ExceededFee => "exceeded max fee",
            ErrorCode::UnableToEstimateGas => "unable to estimate gas",
            ErrorCode::UnableToGetSuggestGas => "unable to get suggest gas",
            ErrorCode::InvalidPublicKey => "invalid public key",
            ErrorCode::InvalidSignature => "invalid signature",
            ErrorCode::UnableToReachNode => "unable to reach node",
        }
    }

    /// Whether the same request may succeed if sent again unchanged.
    pub fn retriable(&self) -> bool {
        matches!(
            self,
            ErrorCode::UnableToGetChainId
                | ErrorCode::UnableToGetLatestBlock
                | ErrorCode::UnableToGetGenesisBlock
                | ErrorCode::UnableToGetAccount
                | ErrorCode::UnableToGetBlock
                | ErrorCode::UnableToGetTransactions
                | ErrorCode::UnableToGetNextNonce
                | ErrorCode::UnableToGetNodeStatus
                | ErrorCode::ExceededFee
                | ErrorCode::UnableToEstimateGas
                | ErrorCode::UnableToGetSuggestGas
                | ErrorCode::UnableToReachNode
        )
    }

    /// The catalog entry as published, without details.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.message().to_string(),
            retriable: self.retriable(),
            details: None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every catalog entry, for `/network/options`.
pub fn catalog() -> Vec<ErrorBody> {
    ErrorCode::ALL.iter().map(ErrorCode::body).collect()
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Rosetta error object on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    pub retriable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A catalog entry plus request-specific context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.code, details),
            None => write!(f, "{}", self.code),
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, details: impl ToString) -> Self {
        Self {
            code,
            details: Some(details.to_string()),
        }
    }

    /// A node failure while doing `code`'s job. Unreachable nodes get the
    /// retriable code 31 wherever `code` itself would not be retriable.
    pub fn client(code: ErrorCode, err: &ClientError) -> Self {
        if err.is_retriable() && !code.retriable() {
            Self::with_details(ErrorCode::UnableToReachNode, err)
        } else {
            Self::with_details(code, err)
        }
    }

    pub fn retriable(&self) -> bool {
        self.code.retriable()
    }

    pub fn body(&self) -> ErrorBody {
        let mut body = self.code.body();
        if let Some(details) = &self.details {
            if let serde_json::Value::Object(map) = json!({ "context": details }) {
                body.details = Some(map);
            }
        }
        body
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<ConstructionError> for ApiError {
    fn from(err: ConstructionError) -> Self {
        let code = match &err {
            ConstructionError::UnsupportedCurve(_) => ErrorCode::UnsupportedPublicKeyType,
            ConstructionError::InvalidPublicKey(_) => ErrorCode::InvalidPublicKey,
            ConstructionError::Check(_) => ErrorCode::ConstructionCheck,
            ConstructionError::InvalidInput(_) => ErrorCode::InvalidInputParam,
            ConstructionError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            ConstructionError::Unmarshal(_) => ErrorCode::UnmarshalProto,
            ConstructionError::Parse(_) => ErrorCode::UnableToParseTransaction,
            ConstructionError::InvalidGasPrice(_) => ErrorCode::InvalidGasPrice,
            ConstructionError::ExceededFee { .. } => ErrorCode::ExceededFee,
            ConstructionError::Nonce(e) => return Self::client(ErrorCode::UnableToGetNextNonce, e),
            ConstructionError::EstimateGas(e) => {
                return Self::client(ErrorCode::UnableToEstimateGas, e)
            }
            ConstructionError::SuggestGasPrice(e) => {
                return Self::client(ErrorCode::UnableToGetSuggestGas, e)
            }
            ConstructionError::Submit(e) => {
                return Self::client(ErrorCode::UnableToSubmitTransaction, e)
            }
        };
        Self::with_details(code, err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::Client(e) => Self::client(ErrorCode::UnableToGetBlock, e),
            LedgerError::TransactionNotFound(_) => {
                Self::with_details(ErrorCode::UnableToGetTransactions, &err)
            }
            LedgerError::MissingReceipt(_) | LedgerError::OrphanLog(_) => {
                Self::with_details(ErrorCode::UnableToGetBlock, &err)
            }
            LedgerError::Codec(_)
            | LedgerError::MissingContractAddress(_)
            | LedgerError::InvalidGasPrice { .. } => {
                Self::with_details(ErrorCode::MalformedValue, &err)
            }
        }
    }
}

impl From<BalanceError> for ApiError {
    fn from(err: BalanceError) -> Self {
        match &err {
            BalanceError::Account { source, .. } => {
                Self::client(ErrorCode::UnableToGetAccount, source)
            }
            BalanceError::LatestBlock(e) => Self::client(ErrorCode::UnableToGetLatestBlock, e),
        }
    }
}

impl From<AddressError> for ApiError {
    fn from(err: AddressError) -> Self {
        Self::with_details(ErrorCode::InvalidAccountAddress, err)
    }
}
