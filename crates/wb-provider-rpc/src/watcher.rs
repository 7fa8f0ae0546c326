use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use wb_provider::{ProviderEvent, ProviderSubscription, WalletResult};
use wb_types::WalletAddress;

use crate::rpc::RpcClient;
use crate::{parse_accounts, parse_chain_id_value};

/// Plain JSON-RPC endpoints cannot push, so account and chain changes are
/// found by diffing `eth_accounts` and `eth_chainId` on an interval.
pub(crate) fn spawn(rpc: RpcClient, poll_interval: Duration, read_timeout: Duration) -> ProviderSubscription {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        let mut last_accounts: Option<Vec<WalletAddress>> = None;
        let mut last_chain: Option<u64> = None;

        loop {
            ticker.tick().await;

            match poll_accounts(&rpc, read_timeout).await {
                Ok(accounts) => {
                    if let Some(previous) = &last_accounts {
                        if *previous != accounts {
                            debug!(count = accounts.len(), "accounts changed");
                            if tx.send(ProviderEvent::AccountsChanged(accounts.clone())).is_err() {
                                return;
                            }
                        }
                    }
                    last_accounts = Some(accounts);
                }
                Err(err) => warn!("event watcher: eth_accounts failed: {err}"),
            }

            match poll_chain(&rpc, read_timeout).await {
                Ok(chain_id) => {
                    if last_chain.is_some_and(|previous| previous != chain_id) {
                        debug!(chain_id, "chain changed");
                        if tx.send(ProviderEvent::ChainChanged(chain_id)).is_err() {
                            return;
                        }
                    }
                    last_chain = Some(chain_id);
                }
                Err(err) => warn!("event watcher: eth_chainId failed: {err}"),
            }

            if tx.is_closed() {
                return;
            }
        }
    });

    ProviderSubscription::new(rx, Some(handle.abort_handle()))
}

async fn poll_accounts(rpc: &RpcClient, timeout: Duration) -> WalletResult<Vec<WalletAddress>> {
    let value = rpc.call("eth_accounts", json!([]), timeout).await?;
    parse_accounts(&value)
}

async fn poll_chain(rpc: &RpcClient, timeout: Duration) -> WalletResult<u64> {
    let value: Value = rpc.call("eth_chainId", json!([]), timeout).await?;
    parse_chain_id_value(&value)
}
