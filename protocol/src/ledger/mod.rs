//! # Ledger Engine
//!
//! Turns what the chain already computed (actions, receipts, transfer logs)
//! into balanced operations. Nothing here re-executes an action or derives a
//! balance on its own; the engine only interprets.
//!
//! ## Pipeline
//!
//! ```text
//! action + receipt ──► classifier ─┐
//!                  └─► fee ────────┼─► reconcile ─► assembler ─► Transaction
//! transfer logs ───────────────────┘
//! ```
//!
//! 1. **classifier**: payload variant → kind, amount, counterparty.
//! 2. **fee**: gas price × gas consumed, pre-Pacific doubling included.
//! 3. **reconcile**: logs win over the classifier for non-fee movements.
//! 4. **assembler**: fee legs first, failed receipts keep fees only, indices
//!    renumbered from zero, empty transactions dropped.
//! 5. **block**: the above across a whole block, all or nothing.
//!
//! **account** answers balance queries at the tip, reading the rewarding
//! pool from protocol state.

pub mod account;
pub mod assembler;
pub mod block;
pub mod classifier;
pub mod fee;
pub mod reconcile;
pub mod types;

use num_bigint::BigUint;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::action::{ActionHash, CodecError};
use crate::client::ClientError;
use crate::config::{NATIVE_DECIMALS, NATIVE_SYMBOL, PACIFIC_BLOCK_HEIGHT};
use crate::identity::{Address, ProtocolAddresses};

pub use account::{fetch_account_balance, AccountBalance, BalanceError};
pub use assembler::assemble;
pub use block::{decode_block, fetch_block, fetch_block_transaction};
pub use classifier::{classify, Movement};
pub use fee::gas_fee;
pub use reconcile::{reconcile, Reconciled};
pub use types::{
    AccountIdentifier, Amount, Block, BlockIdentifier, Currency, Operation, OperationIdentifier,
    OperationStatus, OperationType, Transaction, TransactionIdentifier,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed chain data: {0}")]
    Codec(#[from] CodecError),

    #[error("no receipt for action {0}")]
    MissingReceipt(ActionHash),

    #[error("transfer log references action {0} which is not in the block")]
    OrphanLog(ActionHash),

    #[error("contract creation {0} has no contract address in its receipt")]
    MissingContractAddress(ActionHash),

    #[error("invalid gas price '{value}' in action {hash}")]
    InvalidGasPrice { hash: ActionHash, value: String },

    #[error("transaction {0} not found")]
    TransactionNotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Immutable inputs shared by every decode: currency, pool addresses and
/// the fork height. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerContext {
    pub currency: Currency,
    pub addresses: ProtocolAddresses,
    pub pacific_height: u64,
}

impl LedgerContext {
    pub fn new(currency: Currency, pacific_height: u64) -> Self {
        Self {
            currency,
            addresses: ProtocolAddresses::derive(),
            pacific_height,
        }
    }
}

impl Default for LedgerContext {
    fn default() -> Self {
        Self::new(Currency::new(NATIVE_SYMBOL, NATIVE_DECIMALS), PACIFIC_BLOCK_HEIGHT)
    }
}

// ---------------------------------------------------------------------------
// Postings
// ---------------------------------------------------------------------------

/// One logical movement before it becomes a debit/credit operation pair.
///
/// `debit_amount` and `credit_amount` differ only for the pre-Pacific
/// execution fee; every other posting balances.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub kind: OperationType,
    pub debit: Address,
    pub credit: Address,
    pub debit_amount: BigUint,
    pub credit_amount: BigUint,
    /// Attached to the debit leg only.
    pub metadata: Option<Map<String, Value>>,
}

impl Posting {
    pub fn balanced(kind: OperationType, debit: Address, credit: Address, amount: BigUint) -> Self {
        Self {
            kind,
            debit,
            credit,
            debit_amount: amount.clone(),
            credit_amount: amount,
            metadata: None,
        }
    }
}
