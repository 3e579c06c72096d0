//! Execution receipts as reported by the node.

use crate::config::RECEIPT_STATUS_SUCCESS;
use crate::identity::Address;

use super::envelope::ActionHash;

/// The chain-computed outcome of one action. Read-only to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub action_hash: ActionHash,
    /// Raw status code. `1` is success, everything else is some failure.
    pub status: u64,
    pub gas_consumed: u64,
    /// Set only for contract-creating executions.
    pub contract_address: Option<Address>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESS
    }
}
