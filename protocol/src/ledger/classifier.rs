//! # Action Classifier
//!
//! Maps the one populated payload variant to the movement it implies on its
//! own, without logs. Variants that move no funds map to `None`, and so does
//! an amount of exactly zero.

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use super::types::OperationType;
use super::LedgerError;
use crate::action::{parse_address, parse_amount, Action, Payload, Receipt};
use crate::identity::{Address, ProtocolAddresses};

/// The principal movement implied by an action payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub kind: OperationType,
    pub amount: BigUint,
    pub counterparty: Address,
    /// `false` only for reward claims, where the pool pays the caller.
    pub debit_is_sender: bool,
}

/// Classify an action.
///
/// An action whose payload is missing (a variant this crate does not model)
/// is not an error: it classifies to nothing and only its fee is recorded.
pub fn classify(
    action: &Action,
    receipt: &Receipt,
    addresses: &ProtocolAddresses,
) -> Result<Option<Movement>, LedgerError> {
    let core = action.core()?;
    let Some(payload) = core.payload.as_ref() else {
        debug!(action_hash = %receipt.action_hash, "action payload not modelled, fee only");
        return Ok(None);
    };

    let (kind, amount, counterparty, debit_is_sender) = match payload {
        Payload::Transfer(t) => (
            OperationType::NativeTransfer,
            t.amount.as_str(),
            Some(t.recipient.as_str()),
            true,
        ),
        Payload::Execution(e) => (
            OperationType::InContractTransfer,
            e.amount.as_str(),
            Some(e.contract.as_str()),
            true,
        ),
        Payload::StakeCreate(s) => (
            OperationType::CreateBucket,
            s.staked_amount.as_str(),
            None,
            true,
        ),
        Payload::StakeAddDeposit(s) => (
            OperationType::DepositToBucket,
            s.amount.as_str(),
            None,
            true,
        ),
        Payload::CandidateRegister(c) => (
            OperationType::CandidateSelfStake,
            c.staked_amount.as_str(),
            None,
            true,
        ),
        Payload::DepositToRewardingFund(d) => (
            OperationType::DepositToRewardingFund,
            d.amount.as_str(),
            None,
            true,
        ),
        Payload::ClaimFromRewardingFund(c) => (
            OperationType::ClaimFromRewardingFund,
            c.amount.as_str(),
            None,
            false,
        ),
        Payload::StakeWithdraw(_) => {
            debug!(
                action_hash = %receipt.action_hash,
                "stake withdraw without transfer log, principal not observable"
            );
            return Ok(None);
        }
        Payload::GrantReward(_) | Payload::StakeUnstake(_) => return Ok(None),
    };

    let amount = parse_amount(amount)?;
    if amount.is_zero() {
        return Ok(None);
    }

    let counterparty = match (kind, counterparty) {
        (OperationType::InContractTransfer, Some("")) => receipt
            .contract_address
            .ok_or(LedgerError::MissingContractAddress(receipt.action_hash))?,
        (_, Some(text)) => parse_address(text)?,
        (OperationType::DepositToRewardingFund | OperationType::ClaimFromRewardingFund, None) => {
            addresses.rewarding
        }
        (_, None) => addresses.staking,
    };

    Ok(Some(Movement {
        kind,
        amount,
        counterparty,
        debit_is_sender,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{
        ActionCore, ActionHash, CandidateRegister, ClaimFromRewardingFund, DepositToRewardingFund,
        Execution, GrantReward, StakeAddDeposit, StakeCreate, StakeReclaim, Transfer,
    };

    fn action(payload: Option<Payload>) -> Action {
        Action {
            core: Some(ActionCore {
                version: 1,
                nonce: 1,
                gas_limit: 10_000,
                gas_price: "1".into(),
                chain_id: 1,
                payload,
            }),
            sender_pub_key: Vec::new(),
            signature: Vec::new(),
        }
    }

    fn receipt() -> Receipt {
        Receipt {
            action_hash: ActionHash([3; 32]),
            status: 1,
            gas_consumed: 10_000,
            contract_address: None,
        }
    }

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn transfer_goes_to_recipient() {
        let a = action(Some(Payload::Transfer(Transfer {
            amount: "100".into(),
            recipient: addr(2).to_string(),
            payload: Vec::new(),
        })));
        let m = classify(&a, &receipt(), &ProtocolAddresses::derive())
            .unwrap()
            .unwrap();
        assert_eq!(m.kind, OperationType::NativeTransfer);
        assert_eq!(m.counterparty, addr(2));
        assert_eq!(m.amount, BigUint::from(100u32));
        assert!(m.debit_is_sender);
    }

    #[test]
    fn execution_uses_embedded_contract() {
        let a = action(Some(Payload::Execution(Execution {
            amount: "7".into(),
            contract: addr(9).to_hex(),
            data: vec![1, 2, 3],
        })));
        let m = classify(&a, &receipt(), &ProtocolAddresses::derive())
            .unwrap()
            .unwrap();
        assert_eq!(m.kind, OperationType::InContractTransfer);
        assert_eq!(m.counterparty, addr(9));
    }

    #[test]
    fn contract_creation_uses_receipt_address() {
        let a = action(Some(Payload::Execution(Execution {
            amount: "7".into(),
            contract: String::new(),
            data: Vec::new(),
        })));
        let mut r = receipt();
        r.contract_address = Some(addr(5));
        let m = classify(&a, &r, &ProtocolAddresses::derive()).unwrap().unwrap();
        assert_eq!(m.counterparty, addr(5));

        r.contract_address = None;
        assert!(matches!(
            classify(&a, &r, &ProtocolAddresses::derive()),
            Err(LedgerError::MissingContractAddress(_))
        ));
    }

    #[test]
    fn staking_variants_go_to_staking_pool() {
        let pools = ProtocolAddresses::derive();
        let cases = [
            (
                Payload::StakeCreate(StakeCreate {
                    candidate_name: "robotbp".into(),
                    staked_amount: "100".into(),
                    staked_duration: 91,
                    auto_stake: true,
                    payload: Vec::new(),
                }),
                OperationType::CreateBucket,
            ),
            (
                Payload::StakeAddDeposit(StakeAddDeposit {
                    bucket_index: 4,
                    amount: "100".into(),
                    payload: Vec::new(),
                }),
                OperationType::DepositToBucket,
            ),
            (
                Payload::CandidateRegister(CandidateRegister {
                    candidate: None,
                    staked_amount: "100".into(),
                    staked_duration: 0,
                    auto_stake: false,
                    owner_address: String::new(),
                    payload: Vec::new(),
                }),
                OperationType::CandidateSelfStake,
            ),
        ];
        for (payload, kind) in cases {
            let m = classify(&action(Some(payload)), &receipt(), &pools)
                .unwrap()
                .unwrap();
            assert_eq!(m.kind, kind);
            assert_eq!(m.counterparty, pools.staking);
            assert!(m.debit_is_sender);
        }
    }

    #[test]
    fn rewarding_deposit_and_claim_have_opposite_directions() {
        let pools = ProtocolAddresses::derive();
        let deposit = action(Some(Payload::DepositToRewardingFund(DepositToRewardingFund {
            amount: "5".into(),
            data: Vec::new(),
        })));
        let claim = action(Some(Payload::ClaimFromRewardingFund(ClaimFromRewardingFund {
            amount: "5".into(),
            data: Vec::new(),
        })));
        let d = classify(&deposit, &receipt(), &pools).unwrap().unwrap();
        let c = classify(&claim, &receipt(), &pools).unwrap().unwrap();
        assert_eq!(d.counterparty, pools.rewarding);
        assert_eq!(c.counterparty, pools.rewarding);
        assert!(d.debit_is_sender);
        assert!(!c.debit_is_sender);
    }

    #[test]
    fn zero_amounts_and_fundless_variants_yield_nothing() {
        let pools = ProtocolAddresses::derive();
        let zero = action(Some(Payload::Transfer(Transfer {
            amount: "0".into(),
            recipient: addr(2).to_string(),
            payload: Vec::new(),
        })));
        let withdraw = action(Some(Payload::StakeWithdraw(StakeReclaim {
            bucket_index: 1,
            payload: Vec::new(),
        })));
        let unstake = action(Some(Payload::StakeUnstake(StakeReclaim {
            bucket_index: 1,
            payload: Vec::new(),
        })));
        let grant = action(Some(Payload::GrantReward(GrantReward {
            reward_type: 0,
            height: 100,
        })));
        for a in [zero, withdraw, unstake, grant, action(None)] {
            assert_eq!(classify(&a, &receipt(), &pools).unwrap(), None);
        }
    }

    #[test]
    fn zero_amount_contract_creation_needs_no_address() {
        let a = action(Some(Payload::Execution(Execution {
            amount: "0".into(),
            contract: String::new(),
            data: vec![0x60, 0x80],
        })));
        assert_eq!(
            classify(&a, &receipt(), &ProtocolAddresses::derive()).unwrap(),
            None
        );
    }

    #[test]
    fn malformed_amount_is_an_error() {
        let a = action(Some(Payload::Transfer(Transfer {
            amount: "lots".into(),
            recipient: addr(2).to_string(),
            payload: Vec::new(),
        })));
        assert!(matches!(
            classify(&a, &receipt(), &ProtocolAddresses::derive()),
            Err(LedgerError::Codec(_))
        ));
    }
}
