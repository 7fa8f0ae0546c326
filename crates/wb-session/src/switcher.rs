use tracing::{info, warn};
use wb_provider::{SharedGateway, WalletError, WalletResult};
use wb_types::{NetworkDescriptor, StatusEvent, StatusKind, SwitchOutcome};

use crate::reporter::SharedReporter;

/// Moves the wallet onto a target network.
///
/// Wallets keep "switch to a known chain" and "register a new chain" as
/// separate requests, so switching is a two-step protocol: try the switch,
/// and only if the wallet answers that the chain is unknown, register it
/// from the fallback descriptor (which also switches). Exactly one fallback
/// attempt is made.
pub struct NetworkSwitcher {
    gateway: SharedGateway,
    reporter: SharedReporter,
}

impl NetworkSwitcher {
    pub fn new(gateway: SharedGateway, reporter: SharedReporter) -> Self {
        Self { gateway, reporter }
    }

    pub async fn switch_to(
        &self,
        chain_id: u64,
        fallback: &NetworkDescriptor,
    ) -> WalletResult<SwitchOutcome> {
        if fallback.chain_id != chain_id {
            return Err(self.failed(
                chain_id,
                WalletError::InvalidRequest(format!(
                    "fallback descriptor is for chain {}, not {chain_id}",
                    fallback.chain_id
                )),
            ));
        }

        self.emit(StatusKind::NetworkSwitchRequested { chain_id });

        let outcome = match self.gateway.switch_network(chain_id).await {
            Ok(()) => SwitchOutcome::Switched,
            Err(WalletError::UnrecognizedChain(message)) => {
                info!(chain_id, "chain unknown to wallet ({message}), adding it");
                match self.gateway.add_network(fallback).await {
                    Ok(()) => SwitchOutcome::Added,
                    Err(err) => return Err(self.failed(chain_id, err)),
                }
            }
            Err(err) => return Err(self.failed(chain_id, err)),
        };

        info!(chain_id, ?outcome, "network switch accepted by wallet");
        self.emit(StatusKind::NetworkSwitched { chain_id, outcome });
        Ok(outcome)
    }

    pub async fn switch_to_sepolia(&self) -> WalletResult<SwitchOutcome> {
        let descriptor = NetworkDescriptor::sepolia();
        self.switch_to(descriptor.chain_id, &descriptor).await
    }

    fn failed(&self, chain_id: u64, err: WalletError) -> WalletError {
        warn!(chain_id, "network switch failed: {err}");
        self.emit(StatusKind::NetworkSwitchFailed {
            chain_id,
            error: err.report(),
        });
        err
    }

    fn emit(&self, kind: StatusKind) {
        self.reporter.report(StatusEvent::now(kind));
    }
}
