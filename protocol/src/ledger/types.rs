//! # Ledger Types
//!
//! The chain-agnostic side of the ledger: operations, transactions and
//! blocks in the shape Rosetta clients expect on the wire.
//!
//! Amounts are arbitrary-precision integers internally and decimal strings
//! on the wire. IOTX has 18 decimals, so a single transfer can already
//! overflow a `u64`, and floats are out of the question.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Operation vocabulary
// ---------------------------------------------------------------------------

/// Canonical operation types, in `TransactionLogType` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    InContractTransfer,
    WithdrawBucket,
    CreateBucket,
    DepositToBucket,
    CandidateSelfStake,
    CandidateRegistrationFee,
    GasFee,
    NativeTransfer,
    DepositToRewardingFund,
    ClaimFromRewardingFund,
}

impl OperationType {
    /// Every type, ordered by its numeric log type.
    pub const ALL: [OperationType; 10] = [
        OperationType::InContractTransfer,
        OperationType::WithdrawBucket,
        OperationType::CreateBucket,
        OperationType::DepositToBucket,
        OperationType::CandidateSelfStake,
        OperationType::CandidateRegistrationFee,
        OperationType::GasFee,
        OperationType::NativeTransfer,
        OperationType::DepositToRewardingFund,
        OperationType::ClaimFromRewardingFund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::InContractTransfer => "IN_CONTRACT_TRANSFER",
            OperationType::WithdrawBucket => "WITHDRAW_BUCKET",
            OperationType::CreateBucket => "CREATE_BUCKET",
            OperationType::DepositToBucket => "DEPOSIT_TO_BUCKET",
            OperationType::CandidateSelfStake => "CANDIDATE_SELF_STAKE",
            OperationType::CandidateRegistrationFee => "CANDIDATE_REGISTRATION_FEE",
            OperationType::GasFee => "GAS_FEE",
            OperationType::NativeTransfer => "NATIVE_TRANSFER",
            OperationType::DepositToRewardingFund => "DEPOSIT_TO_REWARDING_FUND",
            OperationType::ClaimFromRewardingFund => "CLAIM_FROM_REWARDING_FUND",
        }
    }

    /// Map a node's numeric `TransactionLogType`.
    pub fn from_log_type(value: i32) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown operation type '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Success,
    Fail,
}

impl OperationStatus {
    pub const ALL: [OperationStatus; 2] = [OperationStatus::Success, OperationStatus::Fail];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Success => "SUCCESS",
            OperationStatus::Fail => "FAIL",
        }
    }

    pub fn successful(&self) -> bool {
        matches!(self, OperationStatus::Success)
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u32,
}

impl Currency {
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// A signed amount. Negative values are debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(with = "decimal_string")]
    pub value: BigInt,
    pub currency: Currency,
}

impl Amount {
    pub fn new(value: impl Into<BigInt>, currency: &Currency) -> Self {
        Self {
            value: value.into(),
            currency: currency.clone(),
        }
    }
}

/// Serde adapter for integers carried as base-10 strings.
///
/// Only the canonical form is accepted: no sign other than a leading `-`
/// and no leading zeros, so equal values always have equal text.
pub mod decimal_string {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.strip_prefix('-').unwrap_or(&text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(de::Error::custom(format!("invalid decimal amount '{text}'")));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(de::Error::custom(format!(
                "non-canonical decimal amount '{text}'"
            )));
        }
        text.parse()
            .map_err(|_| de::Error::custom(format!("invalid decimal amount '{text}'")))
    }
}

// ---------------------------------------------------------------------------
// Operations and transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIdentifier {
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentifier {
    pub address: String,
}

impl AccountIdentifier {
    pub fn new(address: impl ToString) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_identifier: OperationIdentifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_operations: Vec<OperationIdentifier>,
    #[serde(rename = "type")]
    pub kind: OperationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    pub account: AccountIdentifier,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifier {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_identifier: TransactionIdentifier,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIdentifier {
    pub index: u64,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_identifier: BlockIdentifier,
    pub parent_block_identifier: BlockIdentifier,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_types_follow_log_type_numbering() {
        assert_eq!(OperationType::from_log_type(0), Some(OperationType::InContractTransfer));
        assert_eq!(OperationType::from_log_type(6), Some(OperationType::GasFee));
        assert_eq!(OperationType::from_log_type(7), Some(OperationType::NativeTransfer));
        assert_eq!(OperationType::from_log_type(9), Some(OperationType::ClaimFromRewardingFund));
        assert_eq!(OperationType::from_log_type(10), None);
        assert_eq!(OperationType::from_log_type(-1), None);
    }

    #[test]
    fn operation_type_serde_matches_as_str() {
        for kind in OperationType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<OperationType>().unwrap(), kind);
        }
    }

    #[test]
    fn amount_value_is_a_decimal_string() {
        let currency = Currency::new("IOTX", 18);
        let amount = Amount::new(
            "-1010000000000000000000".parse::<BigInt>().unwrap(),
            &currency,
        );
        let json = serde_json::to_value(&amount).unwrap();
        assert_eq!(json["value"], "-1010000000000000000000");
        assert_eq!(json["currency"]["decimals"], 18);
        let back: Amount = serde_json::from_value(json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn amount_rejects_non_decimal_values() {
        for bad in ["", "1e3", "0x10", "1.5", "--1", "+1", "010", "-0010", "00"] {
            let json = serde_json::json!({
                "value": bad,
                "currency": {"symbol": "IOTX", "decimals": 18}
            });
            assert!(serde_json::from_value::<Amount>(json).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn operation_omits_empty_optional_fields() {
        let op = Operation {
            operation_identifier: OperationIdentifier { index: 0 },
            related_operations: Vec::new(),
            kind: OperationType::NativeTransfer,
            status: None,
            account: AccountIdentifier::new("io1abc"),
            amount: Amount::new(5, &Currency::new("IOTX", 18)),
            metadata: None,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "NATIVE_TRANSFER");
        assert!(json.get("status").is_none());
        assert!(json.get("related_operations").is_none());
        assert!(json.get("metadata").is_none());
    }
}
