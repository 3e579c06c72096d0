//! # Transfer Logs
//!
//! Nodes report balance movements caused by an action in one of two shapes,
//! depending on their version:
//!
//! - **Implicit transfer logs** tag each movement with a 32-byte topic. Only
//!   two topics exist: all-zero for a transfer made inside a contract, and
//!   the zero-padded bytes of `"withdrawAmount"` for a stake withdrawal.
//! - **Transaction logs** tag each movement with a numeric
//!   `TransactionLogType`, covering every movement including gas fees.
//!
//! Both normalize to [`TransferLogEntry`]; the reconciler never sees the
//! original shape.

use num_bigint::BigUint;

use super::envelope::ActionHash;
use super::{parse_address, parse_amount, CodecError};
use crate::config::{HASH_LENGTH, WITHDRAW_AMOUNT_TOPIC_SEED};
use crate::identity::Address;
use crate::ledger::types::OperationType;

/// One authoritative balance movement emitted by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLogEntry {
    pub action_hash: ActionHash,
    pub sender: Address,
    pub recipient: Address,
    pub amount: BigUint,
    pub kind: OperationType,
}

// ---------------------------------------------------------------------------
// Implicit transfer logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitTransfer {
    pub topic: Vec<u8>,
    pub amount: String,
    pub sender: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitTransferLog {
    pub action_hash: ActionHash,
    pub transfers: Vec<ImplicitTransfer>,
}

/// Topic of a transfer made from inside a contract.
pub const IN_CONTRACT_TRANSFER_TOPIC: [u8; HASH_LENGTH] = [0u8; HASH_LENGTH];

/// Topic of a stake-bucket withdrawal: the seed bytes right-aligned in a
/// zeroed 32-byte word.
pub fn withdraw_amount_topic() -> [u8; HASH_LENGTH] {
    let seed = WITHDRAW_AMOUNT_TOPIC_SEED.as_bytes();
    let mut topic = [0u8; HASH_LENGTH];
    topic[HASH_LENGTH - seed.len()..].copy_from_slice(seed);
    topic
}

fn kind_for_topic(topic: &[u8]) -> Result<OperationType, CodecError> {
    if topic == IN_CONTRACT_TRANSFER_TOPIC {
        Ok(OperationType::InContractTransfer)
    } else if topic == withdraw_amount_topic() {
        Ok(OperationType::WithdrawBucket)
    } else {
        Err(CodecError::UnknownTopic(hex::encode(topic)))
    }
}

impl ImplicitTransferLog {
    pub fn normalize(&self) -> Result<Vec<TransferLogEntry>, CodecError> {
        self.transfers
            .iter()
            .map(|t| {
                Ok(TransferLogEntry {
                    action_hash: self.action_hash,
                    sender: parse_address(&t.sender)?,
                    recipient: parse_address(&t.recipient)?,
                    amount: parse_amount(&t.amount)?,
                    kind: kind_for_topic(&t.topic)?,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Transaction logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLogTransfer {
    pub log_type: i32,
    pub amount: String,
    pub sender: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLog {
    pub action_hash: ActionHash,
    pub transfers: Vec<TransactionLogTransfer>,
}

impl TransactionLog {
    pub fn normalize(&self) -> Result<Vec<TransferLogEntry>, CodecError> {
        self.transfers
            .iter()
            .map(|t| {
                Ok(TransferLogEntry {
                    action_hash: self.action_hash,
                    sender: parse_address(&t.sender)?,
                    recipient: parse_address(&t.recipient)?,
                    amount: parse_amount(&t.amount)?,
                    kind: OperationType::from_log_type(t.log_type)
                        .ok_or(CodecError::UnknownLogType(t.log_type))?,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Per-block container
// ---------------------------------------------------------------------------

/// Whatever transfer logs a node returned for one block (or one action).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockTransferLogs {
    /// The node has no transfer-log index for this height.
    #[default]
    Unavailable,
    Implicit(Vec<ImplicitTransferLog>),
    Transaction(Vec<TransactionLog>),
}

impl BlockTransferLogs {
    /// Normalize into entries, preserving the node's order.
    pub fn normalize(&self) -> Result<Vec<TransferLogEntry>, CodecError> {
        let mut out = Vec::new();
        match self {
            BlockTransferLogs::Unavailable => {}
            BlockTransferLogs::Implicit(logs) => {
                for log in logs {
                    out.extend(log.normalize()?);
                }
            }
            BlockTransferLogs::Transaction(logs) => {
                for log in logs {
                    out.extend(log.normalize()?);
                }
            }
        }
        Ok(out)
    }

    /// Hashes of every action with at least one log record, including
    /// records whose transfer list is empty.
    pub fn action_hashes(&self) -> Vec<ActionHash> {
        match self {
            BlockTransferLogs::Unavailable => Vec::new(),
            BlockTransferLogs::Implicit(logs) => logs.iter().map(|l| l.action_hash).collect(),
            BlockTransferLogs::Transaction(logs) => logs.iter().map(|l| l.action_hash).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> String {
        Address::from_bytes([b; 20]).to_string()
    }

    #[test]
    fn withdraw_topic_is_right_aligned_seed() {
        let topic = withdraw_amount_topic();
        assert!(topic[..18].iter().all(|b| *b == 0));
        assert_eq!(&topic[18..], b"withdrawAmount");
    }

    #[test]
    fn implicit_log_topics_map_to_kinds() {
        let log = ImplicitTransferLog {
            action_hash: ActionHash([1; 32]),
            transfers: vec![
                ImplicitTransfer {
                    topic: IN_CONTRACT_TRANSFER_TOPIC.to_vec(),
                    amount: "5".into(),
                    sender: addr(1),
                    recipient: addr(2),
                },
                ImplicitTransfer {
                    topic: withdraw_amount_topic().to_vec(),
                    amount: "7".into(),
                    sender: addr(3),
                    recipient: addr(1),
                },
            ],
        };
        let entries = log.normalize().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, OperationType::InContractTransfer);
        assert_eq!(entries[1].kind, OperationType::WithdrawBucket);
        assert_eq!(entries[1].amount, BigUint::from(7u32));
    }

    #[test]
    fn unknown_topic_is_malformed() {
        let log = ImplicitTransferLog {
            action_hash: ActionHash([1; 32]),
            transfers: vec![ImplicitTransfer {
                topic: b"topic 1".to_vec(),
                amount: "5".into(),
                sender: addr(1),
                recipient: addr(2),
            }],
        };
        assert!(matches!(log.normalize(), Err(CodecError::UnknownTopic(_))));
    }

    #[test]
    fn transaction_log_types_map_to_kinds() {
        let log = TransactionLog {
            action_hash: ActionHash([2; 32]),
            transfers: vec![
                TransactionLogTransfer {
                    log_type: 6,
                    amount: "100".into(),
                    sender: addr(1),
                    recipient: addr(9),
                },
                TransactionLogTransfer {
                    log_type: 7,
                    amount: "3".into(),
                    sender: addr(1),
                    recipient: addr(2),
                },
            ],
        };
        let entries = log.normalize().unwrap();
        assert_eq!(entries[0].kind, OperationType::GasFee);
        assert_eq!(entries[1].kind, OperationType::NativeTransfer);
    }

    #[test]
    fn unknown_log_type_is_malformed() {
        let log = TransactionLog {
            action_hash: ActionHash([2; 32]),
            transfers: vec![TransactionLogTransfer {
                log_type: 42,
                amount: "1".into(),
                sender: addr(1),
                recipient: addr(2),
            }],
        };
        assert_eq!(log.normalize(), Err(CodecError::UnknownLogType(42)));
    }

    #[test]
    fn hex_addresses_in_logs_are_normalized() {
        let log = TransactionLog {
            action_hash: ActionHash([2; 32]),
            transfers: vec![TransactionLogTransfer {
                log_type: 0,
                amount: "1".into(),
                sender: Address::from_bytes([4; 20]).to_hex(),
                recipient: addr(5),
            }],
        };
        let entries = log.normalize().unwrap();
        assert_eq!(entries[0].sender, Address::from_bytes([4; 20]));
    }

    #[test]
    fn block_logs_collect_hashes_of_empty_records() {
        let logs = BlockTransferLogs::Implicit(vec![ImplicitTransferLog {
            action_hash: ActionHash([8; 32]),
            transfers: Vec::new(),
        }]);
        assert!(logs.normalize().unwrap().is_empty());
        assert_eq!(logs.action_hashes(), vec![ActionHash([8; 32])]);
        assert!(BlockTransferLogs::Unavailable.action_hashes().is_empty());
    }
}
