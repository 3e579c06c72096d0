//! # Transaction Construction
//!
//! The stateless pipeline an external signer walks through to build, sign
//! and submit a native transfer without the gateway ever holding a key.
//!
//! ## Stages
//!
//! ```text
//! derive ─► preprocess ─► metadata ─► payloads ─► [signer] ─► combine ─► parse / hash ─► submit
//!                            │                                                              │
//!                            └──────────────── ChainClient (async) ─────────────────────────┘
//! ```
//!
//! 1. **derive**: public key → address.
//! 2. **preprocess**: two balanced operations → [`ConstructionIntent`].
//! 3. **metadata**: nonce, gas limit and gas price from the node; fee cap.
//! 4. **payloads**: unsigned action + the digest to sign.
//! 5. **combine**: unsigned action + signature → signed action.
//! 6. **parse**: either form back to operations, signature checked.
//! 7. **hash**: signed action → transaction id.
//! 8. **submit**: broadcast.
//!
//! Every stage except metadata and submit is a pure function.

pub mod builder;
pub mod derive;
pub mod intent;
pub mod metadata;
pub mod signing;
pub mod submit;
pub mod types;
pub mod validate;
pub mod verification;

use num_bigint::BigUint;
use thiserror::Error;

use crate::action::CodecError;
use crate::client::{ChainClient, ClientError};
use crate::crypto::KeyError;
use crate::ledger::Currency;

pub use builder::ActionBuilder;
pub use intent::ConstructionIntent;
pub use types::*;
pub use validate::{check_transfer_operations, TransferOperations};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("unsupported curve type '{0}'")]
    UnsupportedCurve(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(KeyError),

    /// Semantic validation of the requested operations failed.
    #[error("{0}")]
    Check(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unable to decode transaction: {0}")]
    Unmarshal(CodecError),

    #[error("unable to parse transaction: {0}")]
    Parse(CodecError),

    #[error("invalid gas price: {0}")]
    InvalidGasPrice(String),

    #[error("suggested fee {fee} exceeds max fee {max}")]
    ExceededFee { fee: BigUint, max: BigUint },

    #[error("unable to get next nonce: {0}")]
    Nonce(ClientError),

    #[error("unable to estimate gas: {0}")]
    EstimateGas(ClientError),

    #[error("unable to get suggested gas price: {0}")]
    SuggestGasPrice(ClientError),

    #[error("unable to submit transaction: {0}")]
    Submit(ClientError),
}

// ---------------------------------------------------------------------------
// Constructor
// ---------------------------------------------------------------------------

/// Entry point bundling the per-deployment inputs every stage needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    currency: Currency,
    chain_id: u32,
}

impl Constructor {
    pub fn new(currency: Currency, chain_id: u32) -> Self {
        Self { currency, chain_id }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn chain_id(&self) -> u32 {
        self.chain_id
    }

    pub fn derive(&self, req: &DeriveRequest) -> Result<DeriveResponse, ConstructionError> {
        derive::derive(req)
    }

    pub fn preprocess(
        &self,
        req: &PreprocessRequest,
    ) -> Result<PreprocessResponse, ConstructionError> {
        intent::preprocess(req, &self.currency)
    }

    pub async fn metadata(
        &self,
        client: &dyn ChainClient,
        req: &MetadataRequest,
    ) -> Result<MetadataResponse, ConstructionError> {
        metadata::metadata(client, req, &self.currency, self.chain_id).await
    }

    pub fn payloads(&self, req: &PayloadsRequest) -> Result<PayloadsResponse, ConstructionError> {
        builder::payloads(req, &self.currency, self.chain_id)
    }

    pub fn combine(&self, req: &CombineRequest) -> Result<CombineResponse, ConstructionError> {
        signing::combine(req)
    }

    pub fn parse(&self, req: &ParseRequest) -> Result<ParseResponse, ConstructionError> {
        verification::parse(req, &self.currency)
    }

    pub fn hash(
        &self,
        req: &SignedTransactionRequest,
    ) -> Result<TransactionIdentifierResponse, ConstructionError> {
        submit::hash(req)
    }

    pub async fn submit(
        &self,
        client: &dyn ChainClient,
        req: &SignedTransactionRequest,
    ) -> Result<TransactionIdentifierResponse, ConstructionError> {
        submit::submit(client, req).await
    }
}
