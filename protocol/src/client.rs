//! # Chain Client
//!
//! The node RPC boundary. Everything the ledger engine and construction
//! pipeline need from a running IoTeX node goes through [`ChainClient`].
//!
//! The crate ships no transport. An embedding program provides an
//! implementation over whatever connection it manages (gRPC, a fixture
//! set, a cache); connection lifecycle and retries belong there.

use async_trait::async_trait;
use num_bigint::BigUint;
use thiserror::Error;

use crate::action::{Action, ActionHash, BlockTransferLogs, Receipt};
use crate::identity::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The node could not be reached or timed out. Retriable.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The node answered but refused the request.
    #[error("rejected by node: {0}")]
    Rejected(String),
}

impl ClientError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}

/// Account state at the latest height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub balance: BigUint,
    /// Nonce of the last confirmed action.
    pub nonce: u64,
    /// Nonce the next action must use, counting pool entries.
    pub pending_nonce: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMeta {
    pub height: u64,
}

/// A block with its receipts, actions still in wire form.
///
/// Actions are kept as encoded bytes so the action hash is taken over
/// exactly what the chain stored, including fields this crate does not
/// model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub height: u64,
    pub hash: String,
    pub parent_hash: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub actions: Vec<Vec<u8>>,
    pub receipts: Vec<Receipt>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_account(&self, address: &Address) -> Result<AccountState, ClientError>;

    /// Balance the rewarding protocol can still pay out, read from protocol
    /// state rather than an account record.
    async fn get_rewarding_available_balance(&self) -> Result<BigUint, ClientError>;

    async fn get_chain_meta(&self) -> Result<ChainMeta, ClientError>;

    async fn get_raw_block(&self, height: u64) -> Result<RawBlock, ClientError>;

    async fn get_transfer_logs_by_height(
        &self,
        height: u64,
    ) -> Result<BlockTransferLogs, ClientError>;

    async fn get_transfer_log_by_action_hash(
        &self,
        hash: &ActionHash,
    ) -> Result<BlockTransferLogs, ClientError>;

    /// Gas the node expects a signed draft action to consume.
    async fn estimate_gas(&self, action: &Action) -> Result<u64, ClientError>;

    async fn suggest_gas_price(&self) -> Result<u64, ClientError>;

    /// Broadcast a signed action. Returns the node's action hash, if any.
    async fn submit_action(&self, action: &Action) -> Result<Option<String>, ClientError>;

    /// Hashes of the actions waiting in the node's pool.
    async fn get_mempool(&self) -> Result<Vec<ActionHash>, ClientError>;

    /// Node package version, when the node advertises one.
    async fn server_version(&self) -> Result<Option<String>, ClientError>;
}
