//! Preprocess: operations in, a transfer intent out.
//!
//! The intent travels to the metadata stage as the Rosetta `options`
//! object. Overrides the caller pinned in preprocess metadata are carried
//! along so metadata only asks the node for what is still missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{PreprocessRequest, PreprocessResponse};
use super::validate::{check_currency, check_transfer_operations};
use super::ConstructionError;
use crate::identity::Address;
use crate::ledger::{AccountIdentifier, Amount, Currency};

/// A validated, request-scoped transfer description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionIntent {
    pub sender: Address,
    pub recipient: Address,
    /// Non-negative transfer amount in the configured currency.
    pub amount: Amount,
    #[serde(rename = "gasLimit", default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(rename = "gasPrice", default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<Amount>,
    #[serde(
        rename = "suggested_fee_multiplier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fee_multiplier: Option<f64>,
}

pub fn preprocess(
    req: &PreprocessRequest,
    currency: &Currency,
) -> Result<PreprocessResponse, ConstructionError> {
    let transfer = check_transfer_operations(&req.operations, currency)?;

    let empty = Map::new();
    let metadata = req.metadata.as_ref().unwrap_or(&empty);

    let max_fee = match req.max_fee.as_slice() {
        [] => None,
        [fee] => {
            check_currency(fee, currency)?;
            if fee.value.sign() == num_bigint::Sign::Minus {
                return Err(ConstructionError::InvalidInput(
                    "max_fee must not be negative".to_string(),
                ));
            }
            Some(fee.clone())
        }
        more => {
            return Err(ConstructionError::InvalidInput(format!(
                "expected at most 1 max_fee amount, got {}",
                more.len()
            )))
        }
    };

    let fee_multiplier = match req.suggested_fee_multiplier {
        Some(m) if !m.is_finite() || m <= 0.0 => {
            return Err(ConstructionError::InvalidInput(format!(
                "suggested_fee_multiplier must be a positive number, got {m}"
            )))
        }
        other => other,
    };

    let options = ConstructionIntent {
        sender: transfer.sender,
        recipient: transfer.recipient,
        amount: Amount::new(transfer.amount, currency),
        gas_limit: metadata_u64(metadata, "gasLimit")?,
        gas_price: metadata_u64(metadata, "gasPrice")?,
        nonce: metadata_u64(metadata, "nonce")?,
        max_fee,
        fee_multiplier,
    };

    Ok(PreprocessResponse {
        required_public_keys: vec![AccountIdentifier::new(options.sender)],
        options,
    })
}

/// Read an optional unsigned integer; anything else present is rejected.
fn metadata_u64(map: &Map<String, Value>, key: &str) -> Result<Option<u64>, ConstructionError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ConstructionError::InvalidInput(format!("{key} must be an unsigned integer"))
        }),
    }
}
