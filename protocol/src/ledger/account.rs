//! Account balances at the chain tip.
//!
//! The rewarding pool is not an ordinary account: its spendable balance
//! lives in rewarding protocol state and it never sends actions, so its
//! nonce is always zero.

use num_bigint::BigUint;
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::BlockIdentifier;
use super::LedgerContext;
use crate::client::{ChainClient, ClientError};
use crate::identity::Address;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("unable to read account {address}: {source}")]
    Account {
        address: Address,
        #[source]
        source: ClientError,
    },

    #[error("unable to read the latest block: {0}")]
    LatestBlock(#[source] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub block: BlockIdentifier,
    pub balance: BigUint,
    /// Nonce the account's next action must use.
    pub nonce: u64,
}

/// Balance and next nonce of `address`, reported against the latest block.
#[instrument(skip(client, ctx))]
pub async fn fetch_account_balance(
    client: &dyn ChainClient,
    address: &Address,
    ctx: &LedgerContext,
) -> Result<AccountBalance, BalanceError> {
    let account_err = |source| BalanceError::Account {
        address: *address,
        source,
    };

    let (balance, nonce) = if *address == ctx.addresses.rewarding {
        debug!("reading rewarding pool balance from protocol state");
        let balance = client
            .get_rewarding_available_balance()
            .await
            .map_err(account_err)?;
        (balance, 0)
    } else {
        let state = client.get_account(address).await.map_err(account_err)?;
        (state.balance, state.pending_nonce)
    };

    let meta = client
        .get_chain_meta()
        .await
        .map_err(BalanceError::LatestBlock)?;
    let tip = client
        .get_raw_block(meta.height)
        .await
        .map_err(BalanceError::LatestBlock)?;

    Ok(AccountBalance {
        block: BlockIdentifier {
            index: tip.height,
            hash: tip.hash,
        },
        balance,
        nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionHash, BlockTransferLogs};
    use crate::client::{AccountState, ChainMeta, RawBlock};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct PoolClient {
        accounts_read: Mutex<Vec<Address>>,
        tip_missing: bool,
    }

    #[async_trait]
    impl ChainClient for PoolClient {
        async fn get_account(&self, address: &Address) -> Result<AccountState, ClientError> {
            if let Ok(mut read) = self.accounts_read.lock() {
                read.push(*address);
            }
            Ok(AccountState {
                balance: BigUint::from(1_000u32),
                nonce: 4,
                pending_nonce: 5,
            })
        }
        async fn get_rewarding_available_balance(&self) -> Result<BigUint, ClientError> {
            Ok(BigUint::from(777u32))
        }
        async fn get_chain_meta(&self) -> Result<ChainMeta, ClientError> {
            Ok(ChainMeta { height: 42 })
        }
        async fn get_raw_block(&self, height: u64) -> Result<RawBlock, ClientError> {
            if self.tip_missing {
                return Err(ClientError::Unavailable("timeout".into()));
            }
            Ok(RawBlock {
                height,
                hash: "cc".repeat(32),
                parent_hash: "dd".repeat(32),
                timestamp_ms: 0,
                actions: Vec::new(),
                receipts: Vec::new(),
            })
        }
        async fn get_transfer_logs_by_height(&self, _: u64) -> Result<BlockTransferLogs, ClientError> {
            Ok(BlockTransferLogs::Unavailable)
        }
        async fn get_transfer_log_by_action_hash(
            &self,
            _: &ActionHash,
        ) -> Result<BlockTransferLogs, ClientError> {
            Ok(BlockTransferLogs::Unavailable)
        }
        async fn estimate_gas(&self, _: &Action) -> Result<u64, ClientError> {
            Ok(0)
        }
        async fn suggest_gas_price(&self) -> Result<u64, ClientError> {
            Ok(0)
        }
        async fn submit_action(&self, _: &Action) -> Result<Option<String>, ClientError> {
            Ok(None)
        }
        async fn get_mempool(&self) -> Result<Vec<ActionHash>, ClientError> {
            Ok(Vec::new())
        }
        async fn server_version(&self) -> Result<Option<String>, ClientError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn ordinary_account_reports_pending_nonce() {
        let client = PoolClient::default();
        let address = Address::from_bytes([3; 20]);
        let got = fetch_account_balance(&client, &address, &LedgerContext::default())
            .await
            .unwrap();
        assert_eq!(got.balance, BigUint::from(1_000u32));
        assert_eq!(got.nonce, 5);
        assert_eq!(got.block.index, 42);
        assert_eq!(got.block.hash, "cc".repeat(32));
    }

    #[tokio::test]
    async fn rewarding_pool_reads_protocol_state() {
        let client = PoolClient::default();
        let pool = Address::parse("io1c0hhmnyqez4cma9np8h5elahxy9uc2vxj2g8lc").unwrap();
        let got = fetch_account_balance(&client, &pool, &LedgerContext::default())
            .await
            .unwrap();
        assert_eq!(got.balance, BigUint::from(777u32));
        assert_eq!(got.nonce, 0);
        assert_eq!(got.block.index, 42);
        assert!(client.accounts_read.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn staking_pool_is_an_ordinary_account() {
        let client = PoolClient::default();
        let staking = LedgerContext::default().addresses.staking;
        let got = fetch_account_balance(&client, &staking, &LedgerContext::default())
            .await
            .unwrap();
        assert_eq!(got.balance, BigUint::from(1_000u32));
        assert_eq!(*client.accounts_read.lock().unwrap(), vec![staking]);
    }

    #[tokio::test]
    async fn missing_tip_is_a_latest_block_error() {
        let client = PoolClient {
            tip_missing: true,
            ..PoolClient::default()
        };
        let err = fetch_account_balance(
            &client,
            &Address::from_bytes([3; 20]),
            &LedgerContext::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BalanceError::LatestBlock(ClientError::Unavailable(_))));
    }
}
