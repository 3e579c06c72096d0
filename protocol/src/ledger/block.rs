//! # Block Decoder
//!
//! Runs the ledger pipeline over a whole block. Decoding is all or
//! nothing: a missing receipt, a log for an action that is not in the
//! block, or any malformed value fails the entire block rather than
//! returning a partial ledger.

use std::collections::HashMap;

use prost::Message;
use tracing::{debug, instrument};

use super::assembler::assemble;
use super::reconcile::reconcile;
use super::types::{Block, BlockIdentifier, Transaction};
use super::{LedgerContext, LedgerError};
use crate::action::{Action, ActionHash, BlockTransferLogs, CodecError, Receipt, TransferLogEntry};
use crate::client::{ChainClient, RawBlock};
use crate::crypto::hash256b;

/// Decode a block's actions into transactions, in block order.
pub fn decode_block(
    block: &RawBlock,
    logs: &BlockTransferLogs,
    ctx: &LedgerContext,
) -> Result<Vec<Transaction>, LedgerError> {
    let actions = decode_actions(block)?;
    let receipts = index_receipts(&block.receipts);
    let grouped = group_logs(logs)?;

    for hash in grouped.keys() {
        if !actions.iter().any(|(h, _)| h == hash) {
            return Err(LedgerError::OrphanLog(*hash));
        }
    }

    let mut transactions = Vec::with_capacity(actions.len());
    for (hash, action) in &actions {
        let logs = grouped.get(hash).map(Vec::as_slice);
        if let Some(tx) = decode_action(*hash, action, &receipts, block.height, logs, ctx)? {
            transactions.push(tx);
        }
    }

    debug!(
        height = block.height,
        actions = actions.len(),
        transactions = transactions.len(),
        "decoded block"
    );
    Ok(transactions)
}

fn decode_action(
    hash: ActionHash,
    action: &Action,
    receipts: &HashMap<ActionHash, &Receipt>,
    height: u64,
    logs: Option<&[TransferLogEntry]>,
    ctx: &LedgerContext,
) -> Result<Option<Transaction>, LedgerError> {
    let receipt = receipts
        .get(&hash)
        .copied()
        .ok_or(LedgerError::MissingReceipt(hash))?;
    let sender = action.sender_address()?;
    let reconciled = reconcile(action, sender, receipt, height, logs, ctx)?;
    Ok(assemble(hash, reconciled, receipt.is_success(), &ctx.currency))
}

fn decode_actions(block: &RawBlock) -> Result<Vec<(ActionHash, Action)>, LedgerError> {
    block
        .actions
        .iter()
        .map(|bytes| {
            let action = Action::decode(bytes.as_slice()).map_err(CodecError::from)?;
            Ok((ActionHash(hash256b(bytes)), action))
        })
        .collect()
}

fn index_receipts(receipts: &[Receipt]) -> HashMap<ActionHash, &Receipt> {
    receipts.iter().map(|r| (r.action_hash, r)).collect()
}

/// Group normalized log entries by action. Records without transfers still
/// get an (empty) entry so they suppress classification.
fn group_logs(
    logs: &BlockTransferLogs,
) -> Result<HashMap<ActionHash, Vec<TransferLogEntry>>, LedgerError> {
    let mut grouped: HashMap<ActionHash, Vec<TransferLogEntry>> = logs
        .action_hashes()
        .into_iter()
        .map(|h| (h, Vec::new()))
        .collect();
    for entry in logs.normalize()? {
        grouped.entry(entry.action_hash).or_default().push(entry);
    }
    Ok(grouped)
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetch and decode the block at `height`.
///
/// Block 1 has no parent worth reporting and names itself as parent.
#[instrument(skip(client, ctx))]
pub async fn fetch_block(
    client: &dyn ChainClient,
    height: u64,
    ctx: &LedgerContext,
) -> Result<Block, LedgerError> {
    let raw = client.get_raw_block(height).await?;
    let logs = client.get_transfer_logs_by_height(height).await?;
    let transactions = decode_block(&raw, &logs, ctx)?;

    let parent_block_identifier = if raw.height <= 1 {
        BlockIdentifier {
            index: raw.height,
            hash: raw.hash.clone(),
        }
    } else {
        BlockIdentifier {
            index: raw.height - 1,
            hash: raw.parent_hash.clone(),
        }
    };

    Ok(Block {
        block_identifier: BlockIdentifier {
            index: raw.height,
            hash: raw.hash,
        },
        parent_block_identifier,
        timestamp: raw.timestamp_ms,
        transactions,
    })
}

/// Fetch and decode a single action of the block at `height`.
#[instrument(skip(client, ctx))]
pub async fn fetch_block_transaction(
    client: &dyn ChainClient,
    height: u64,
    tx_hash: &str,
    ctx: &LedgerContext,
) -> Result<Transaction, LedgerError> {
    let wanted: ActionHash = tx_hash.parse()?;
    let raw = client.get_raw_block(height).await?;
    let (hash, action) = decode_actions(&raw)?
        .into_iter()
        .find(|(h, _)| *h == wanted)
        .ok_or_else(|| LedgerError::TransactionNotFound(tx_hash.to_string()))?;

    let logs = client.get_transfer_log_by_action_hash(&hash).await?;
    let grouped = group_logs(&logs)?;
    if let Some(orphan) = grouped.keys().find(|h| **h != hash) {
        return Err(LedgerError::OrphanLog(*orphan));
    }

    let receipts = index_receipts(&raw.receipts);
    decode_action(
        hash,
        &action,
        &receipts,
        raw.height,
        grouped.get(&hash).map(Vec::as_slice),
        ctx,
    )?
    .ok_or_else(|| LedgerError::TransactionNotFound(tx_hash.to_string()))
}
