//! # Fee Calculator
//!
//! Gas fee = gas price × gas consumed, debited from the sender and credited
//! to the rewarding pool. Gas is spent whether or not the action succeeded,
//! so the receipt status does not matter here.
//!
//! Execution actions below the Pacific height were charged twice the
//! nominal fee, but only the nominal fee is credited to the pool in the
//! data the chain reports. Both amounts are reproduced exactly as observed
//! and the debit leg carries `"fee_asymmetry": true`.

use num_bigint::BigUint;
use num_traits::Zero;
use serde_json::{Map, Value};
use tracing::debug;

use super::types::OperationType;
use super::{LedgerContext, LedgerError, Posting};
use crate::action::{parse_amount, ActionCore, Payload, Receipt};
use crate::identity::Address;

/// Metadata flag set on the debit leg of a doubled pre-Pacific fee.
pub const FEE_ASYMMETRY_KEY: &str = "fee_asymmetry";

/// Compute the gas fee posting for one action, or `None` when it is zero.
pub fn gas_fee(
    core: &ActionCore,
    sender: Address,
    receipt: &Receipt,
    height: u64,
    ctx: &LedgerContext,
) -> Result<Option<Posting>, LedgerError> {
    let price = parse_amount(&core.gas_price).map_err(|_| LedgerError::InvalidGasPrice {
        hash: receipt.action_hash,
        value: core.gas_price.clone(),
    })?;
    let fee = price * BigUint::from(receipt.gas_consumed);
    if fee.is_zero() {
        return Ok(None);
    }

    let is_execution = matches!(core.payload, Some(Payload::Execution(_)));
    if is_execution && height < ctx.pacific_height {
        let doubled = &fee * 2u32;
        debug!(
            action_hash = %receipt.action_hash,
            height,
            debit = %doubled,
            credit = %fee,
            "pre-Pacific execution fee, debit is twice the pool credit"
        );
        let mut metadata = Map::new();
        metadata.insert(FEE_ASYMMETRY_KEY.to_string(), Value::Bool(true));
        return Ok(Some(Posting {
            kind: OperationType::GasFee,
            debit: sender,
            credit: ctx.addresses.rewarding,
            debit_amount: doubled,
            credit_amount: fee,
            metadata: Some(metadata),
        }));
    }

    Ok(Some(Posting::balanced(
        OperationType::GasFee,
        sender,
        ctx.addresses.rewarding,
        fee,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionHash, Execution, Transfer};

    fn core(gas_price: &str, payload: Payload) -> ActionCore {
        ActionCore {
            version: 1,
            nonce: 0,
            gas_limit: 100_000,
            gas_price: gas_price.into(),
            chain_id: 1,
            payload: Some(payload),
        }
    }

    fn transfer() -> Payload {
        Payload::Transfer(Transfer {
            amount: "1".into(),
            recipient: Address::from_bytes([2; 20]).to_string(),
            payload: Vec::new(),
        })
    }

    fn execution() -> Payload {
        Payload::Execution(Execution {
            amount: "0".into(),
            contract: Address::from_bytes([7; 20]).to_string(),
            data: Vec::new(),
        })
    }

    fn receipt(status: u64, gas: u64) -> Receipt {
        Receipt {
            action_hash: ActionHash([1; 32]),
            status,
            gas_consumed: gas,
            contract_address: None,
        }
    }

    const SENDER: Address = Address::from_bytes([1; 20]);

    #[test]
    fn fee_is_price_times_consumed() {
        let ctx = LedgerContext::default();
        let posting = gas_fee(
            &core("1000000000000", transfer()),
            SENDER,
            &receipt(1, 10_000),
            1_000_000,
            &ctx,
        )
        .unwrap()
        .unwrap();
        let expected = BigUint::from(10_000_000_000_000_000u64);
        assert_eq!(posting.kind, OperationType::GasFee);
        assert_eq!(posting.debit, SENDER);
        assert_eq!(posting.credit, ctx.addresses.rewarding);
        assert_eq!(posting.debit_amount, expected);
        assert_eq!(posting.credit_amount, expected);
        assert!(posting.metadata.is_none());
    }

    #[test]
    fn fee_is_charged_on_failure_too() {
        let ctx = LedgerContext::default();
        let posting = gas_fee(&core("2", transfer()), SENDER, &receipt(0, 21), 5, &ctx).unwrap();
        assert_eq!(posting.unwrap().debit_amount, BigUint::from(42u32));
    }

    #[test]
    fn zero_fee_is_omitted() {
        let ctx = LedgerContext::default();
        assert!(gas_fee(&core("0", transfer()), SENDER, &receipt(1, 100), 5, &ctx)
            .unwrap()
            .is_none());
        assert!(gas_fee(&core("5", transfer()), SENDER, &receipt(1, 0), 5, &ctx)
            .unwrap()
            .is_none());
    }

    #[test]
    fn pre_pacific_execution_debits_double() {
        let ctx = LedgerContext::default();
        let posting = gas_fee(
            &core("3", execution()),
            SENDER,
            &receipt(1, 100),
            ctx.pacific_height - 1,
            &ctx,
        )
        .unwrap()
        .unwrap();
        assert_eq!(posting.debit_amount, BigUint::from(600u32));
        assert_eq!(posting.credit_amount, BigUint::from(300u32));
        let metadata = posting.metadata.unwrap();
        assert_eq!(metadata.get(FEE_ASYMMETRY_KEY), Some(&Value::Bool(true)));
    }

    #[test]
    fn doubling_stops_at_pacific_height() {
        let ctx = LedgerContext::default();
        let posting = gas_fee(
            &core("3", execution()),
            SENDER,
            &receipt(1, 100),
            ctx.pacific_height,
            &ctx,
        )
        .unwrap()
        .unwrap();
        assert_eq!(posting.debit_amount, posting.credit_amount);
    }

    #[test]
    fn pre_pacific_transfer_is_not_doubled() {
        let ctx = LedgerContext::default();
        let posting = gas_fee(&core("3", transfer()), SENDER, &receipt(1, 100), 10, &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(posting.debit_amount, BigUint::from(300u32));
    }

    #[test]
    fn unparsable_gas_price_is_reported() {
        let ctx = LedgerContext::default();
        assert!(matches!(
            gas_fee(&core("1.5", transfer()), SENDER, &receipt(1, 1), 10, &ctx),
            Err(LedgerError::InvalidGasPrice { .. })
        ));
    }
}
