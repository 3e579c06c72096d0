//! # Operation Assembler
//!
//! Lays postings out as the final operation list of one transaction:
//!
//! - fee postings first, then principal postings;
//! - principal postings dropped when the receipt is not a success;
//! - each posting becomes a debit leg followed by a credit leg, and the
//!   credit leg lists the debit leg in `related_operations`;
//! - indices are `0..n` in emission order.
//!
//! A transaction that ends up with no operations is dropped.

use num_bigint::BigInt;

use super::reconcile::Reconciled;
use super::types::{
    AccountIdentifier, Amount, Currency, Operation, OperationIdentifier, OperationStatus,
    Transaction, TransactionIdentifier,
};
use super::Posting;
use crate::action::ActionHash;

pub fn assemble(
    hash: ActionHash,
    reconciled: Reconciled,
    receipt_success: bool,
    currency: &Currency,
) -> Option<Transaction> {
    let Reconciled { fees, principal } = reconciled;
    let principal = if receipt_success { principal } else { Vec::new() };

    let mut operations = Vec::with_capacity(2 * (fees.len() + principal.len()));
    for posting in fees.into_iter().chain(principal) {
        push_pair(&mut operations, posting, currency);
    }

    if operations.is_empty() {
        return None;
    }
    Some(Transaction {
        transaction_identifier: TransactionIdentifier {
            hash: hash.to_string(),
        },
        operations,
    })
}

fn push_pair(operations: &mut Vec<Operation>, posting: Posting, currency: &Currency) {
    let debit_index = operations.len() as u64;
    operations.push(Operation {
        operation_identifier: OperationIdentifier { index: debit_index },
        related_operations: Vec::new(),
        kind: posting.kind,
        status: Some(OperationStatus::Success),
        account: AccountIdentifier::new(posting.debit),
        amount: Amount::new(-BigInt::from(posting.debit_amount), currency),
        metadata: posting.metadata,
    });
    operations.push(Operation {
        operation_identifier: OperationIdentifier {
            index: debit_index + 1,
        },
        related_operations: vec![OperationIdentifier { index: debit_index }],
        kind: posting.kind,
        status: Some(OperationStatus::Success),
        account: AccountIdentifier::new(posting.credit),
        amount: Amount::new(BigInt::from(posting.credit_amount), currency),
        metadata: None,
    });
}
