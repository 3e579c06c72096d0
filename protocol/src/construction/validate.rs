//! Shared checks on the two-operation transfer representation.
//!
//! A native transfer is always expressed as exactly two `NATIVE_TRANSFER`
//! operations: the sender's debit first, the recipient's credit second.

use num_bigint::{BigInt, BigUint, Sign};

use super::ConstructionError;
use crate::identity::Address;
use crate::ledger::{
    AccountIdentifier, Amount, Currency, Operation, OperationIdentifier, OperationType,
};

/// The facts carried by a validated operation pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOperations {
    pub sender: Address,
    pub recipient: Address,
    pub amount: BigUint,
}

/// Validate a transfer operation pair against the configured currency.
pub fn check_transfer_operations(
    operations: &[Operation],
    currency: &Currency,
) -> Result<TransferOperations, ConstructionError> {
    let [debit, credit] = operations else {
        return Err(ConstructionError::Check(format!(
            "expected 2 operations, got {}",
            operations.len()
        )));
    };

    for op in [debit, credit] {
        if op.kind != OperationType::NativeTransfer {
            return Err(ConstructionError::Check(format!(
                "unsupported operation type {}",
                op.kind
            )));
        }
        check_currency(&op.amount, currency)?;
    }

    if debit.amount.value != -&credit.amount.value {
        return Err(ConstructionError::Check(
            "amount value don't match".to_string(),
        ));
    }
    let amount = credit
        .amount
        .value
        .to_biguint()
        .ok_or_else(|| ConstructionError::Check("credit amount is negative".to_string()))?;

    let sender = Address::parse(&debit.account.address)
        .map_err(|e| ConstructionError::Check(format!("invalid sender address: {e}")))?;
    let recipient = Address::parse(&credit.account.address)
        .map_err(|e| ConstructionError::Check(format!("invalid recipient address: {e}")))?;

    Ok(TransferOperations {
        sender,
        recipient,
        amount,
    })
}

/// Reject amounts in any currency other than the configured one.
pub fn check_currency(amount: &Amount, currency: &Currency) -> Result<(), ConstructionError> {
    if amount.currency != *currency {
        return Err(ConstructionError::Check(format!(
            "invalid currency {}/{}",
            amount.currency.symbol, amount.currency.decimals
        )));
    }
    Ok(())
}

/// The operation pair for a transfer, as parse and preprocess see it.
pub fn transfer_operations(
    sender: &Address,
    recipient: &Address,
    amount: &BigUint,
    currency: &Currency,
) -> Vec<Operation> {
    let value = BigInt::from_biguint(Sign::Plus, amount.clone());
    vec![
        Operation {
            operation_identifier: OperationIdentifier { index: 0 },
            related_operations: Vec::new(),
            kind: OperationType::NativeTransfer,
            status: None,
            account: AccountIdentifier::new(sender),
            amount: Amount::new(-value.clone(), currency),
            metadata: None,
        },
        Operation {
            operation_identifier: OperationIdentifier { index: 1 },
            related_operations: vec![OperationIdentifier { index: 0 }],
            kind: OperationType::NativeTransfer,
            status: None,
            account: AccountIdentifier::new(recipient),
            amount: Amount::new(value, currency),
            metadata: None,
        },
    ]
}
