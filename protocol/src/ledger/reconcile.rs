//! # Transfer-Log Reconciler
//!
//! Decides where an action's postings come from.
//!
//! When the node has any log record for the action, the log is the truth
//! for every non-fee movement and the classifier is not consulted at all.
//! `GAS_FEE` records, which only transaction logs carry, also replace the
//! computed fee. Without a log record the classifier and fee calculator
//! are used, which is the only option for blocks older than log indexing.

use num_traits::Zero;
use tracing::trace;

use super::classifier::classify;
use super::fee::gas_fee;
use super::types::OperationType;
use super::{LedgerContext, LedgerError, Posting};
use crate::action::{Action, Payload, Receipt, TransferLogEntry};
use crate::identity::Address;

/// Postings for one action, split by role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub fees: Vec<Posting>,
    pub principal: Vec<Posting>,
}

/// Build the postings of one action.
///
/// `logs` is `None` when the node has no log record for the action and
/// `Some` (possibly empty) when it does.
pub fn reconcile(
    action: &Action,
    sender: Address,
    receipt: &Receipt,
    height: u64,
    logs: Option<&[TransferLogEntry]>,
    ctx: &LedgerContext,
) -> Result<Reconciled, LedgerError> {
    let core = action.core()?;

    let Some(entries) = logs else {
        if matches!(core.payload, Some(Payload::GrantReward(_))) {
            // System action appended by the block producer, no gas market.
            return Ok(Reconciled::default());
        }
        let fees = gas_fee(core, sender, receipt, height, ctx)?
            .into_iter()
            .collect();
        let principal = if receipt.is_success() {
            classify(action, receipt, &ctx.addresses)?
                .map(|m| {
                    if m.debit_is_sender {
                        Posting::balanced(m.kind, sender, m.counterparty, m.amount)
                    } else {
                        Posting::balanced(m.kind, m.counterparty, sender, m.amount)
                    }
                })
                .into_iter()
                .collect()
        } else {
            Vec::new()
        };
        return Ok(Reconciled { fees, principal });
    };

    let mut out = Reconciled::default();
    for entry in entries.iter().filter(|e| !e.amount.is_zero()) {
        let posting =
            Posting::balanced(entry.kind, entry.sender, entry.recipient, entry.amount.clone());
        if entry.kind == OperationType::GasFee {
            out.fees.push(posting);
        } else {
            out.principal.push(posting);
        }
    }
    trace!(
        action_hash = %receipt.action_hash,
        fees = out.fees.len(),
        principal = out.principal.len(),
        "reconciled from transfer log"
    );

    if out.fees.is_empty() {
        out.fees.extend(gas_fee(core, sender, receipt, height, ctx)?);
    }
    Ok(out)
}
