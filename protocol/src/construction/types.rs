//! Request and response bodies of the construction stages.
//!
//! Shapes follow the Rosetta construction API minus the
//! `network_identifier`, which the HTTP layer validates and strips.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::intent::ConstructionIntent;
use crate::ledger::{AccountIdentifier, Amount, Operation, TransactionIdentifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosettaPublicKey {
    pub hex_bytes: String,
    pub curve_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPayload {
    pub account_identifier: AccountIdentifier,
    pub hex_bytes: String,
    pub signature_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosettaSignature {
    pub signing_payload: SigningPayload,
    pub public_key: RosettaPublicKey,
    pub signature_type: String,
    pub hex_bytes: String,
}

/// Nonce and gas parameters chosen by the metadata stage.
///
/// Carried as plain integers, never floats or strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionMetadata {
    pub nonce: u64,
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    #[serde(rename = "gasPrice")]
    pub gas_price: u64,
}

// ---------------------------------------------------------------------------
// Derive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveRequest {
    pub public_key: RosettaPublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveResponse {
    pub account_identifier: AccountIdentifier,
}

// ---------------------------------------------------------------------------
// Preprocess
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessRequest {
    pub operations: Vec<Operation>,
    /// Optional `gasLimit`, `gasPrice` and `nonce` overrides.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub max_fee: Vec<Amount>,
    #[serde(default)]
    pub suggested_fee_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessResponse {
    pub options: ConstructionIntent,
    pub required_public_keys: Vec<AccountIdentifier>,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRequest {
    pub options: ConstructionIntent,
    #[serde(default)]
    pub public_keys: Vec<RosettaPublicKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub metadata: ConstructionMetadata,
    pub suggested_fee: Vec<Amount>,
}

// ---------------------------------------------------------------------------
// Payloads / Combine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadsRequest {
    pub operations: Vec<Operation>,
    pub metadata: ConstructionMetadata,
    #[serde(default)]
    pub public_keys: Vec<RosettaPublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadsResponse {
    pub unsigned_transaction: String,
    pub payloads: Vec<SigningPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineRequest {
    pub unsigned_transaction: String,
    pub signatures: Vec<RosettaSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineResponse {
    pub signed_transaction: String,
}

// ---------------------------------------------------------------------------
// Parse / Hash / Submit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    pub signed: bool,
    pub transaction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub account_identifier_signers: Vec<AccountIdentifier>,
    pub metadata: ConstructionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransactionRequest {
    pub signed_transaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifierResponse {
    pub transaction_identifier: TransactionIdentifier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_uses_camel_case_integers() {
        let metadata = ConstructionMetadata {
            nonce: 10,
            gas_limit: 20010,
            gas_price: 11_000_000_000_000_000_000,
        };
        let json = serde_json::to_value(metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nonce": 10,
                "gasLimit": 20010,
                "gasPrice": 11_000_000_000_000_000_000u64
            })
        );
    }

    #[test]
    fn metadata_rejects_string_numbers() {
        let json = serde_json::json!({"nonce": "10", "gasLimit": 1, "gasPrice": 1});
        assert!(serde_json::from_value::<ConstructionMetadata>(json).is_err());
    }
}
