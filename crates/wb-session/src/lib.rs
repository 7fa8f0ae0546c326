//! Session core of the wallet bridge: connection lifecycle, transaction
//! tracking, network switching and token reads over a [`ProviderGateway`].

mod config;
mod query;
mod reporter;
mod session;
mod switcher;
mod tracker;

#[cfg(test)]
mod testing;

pub use config::SessionConfig;
pub use query::TokenQuery;
pub use reporter::{ChannelReporter, FanoutReporter, SharedReporter, StatusReporter, TracingReporter};
pub use session::{ConnectedSession, ConnectionState, Session, WalletSession};
pub use switcher::NetworkSwitcher;
pub use tracker::TransactionTracker;

use std::sync::Arc;
use tracing::info;
use wb_provider::{ProviderGateway, SharedGateway, WalletResult};
use wb_types::StatusKind;

/// All components wired to one gateway and one session.
pub struct WalletBridge {
    gateway: SharedGateway,
    session: Arc<WalletSession>,
    tracker: TransactionTracker,
    switcher: NetworkSwitcher,
    query: TokenQuery,
}

impl WalletBridge {
    pub fn new(gateway: SharedGateway, reporter: SharedReporter, config: SessionConfig) -> Self {
        let session = Arc::new(WalletSession::new(
            Arc::clone(&gateway),
            Arc::clone(&reporter),
            config,
        ));
        Self {
            tracker: TransactionTracker::new(Arc::clone(&session), Arc::clone(&gateway)),
            switcher: NetworkSwitcher::new(Arc::clone(&gateway), reporter),
            query: TokenQuery::new(Arc::clone(&session), Arc::clone(&gateway)),
            session,
            gateway,
        }
    }

    pub fn gateway(&self) -> &dyn ProviderGateway {
        self.gateway.as_ref()
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn tracker(&self) -> &TransactionTracker {
        &self.tracker
    }

    pub fn switcher(&self) -> &NetworkSwitcher {
        &self.switcher
    }

    pub fn query(&self) -> &TokenQuery {
        &self.query
    }

    /// Reports whether a provider is present and, if the wallet already
    /// authorized this client, connects without waiting for the user.
    ///
    /// Uses the silent account probe, so no consent prompt is shown unless
    /// the wallet already lists accounts. Returns whether a session was
    /// established.
    pub async fn resume(&self) -> WalletResult<bool> {
        let available = self.gateway.is_available();
        self.session.emit(StatusKind::ProviderDetected { available });
        if !available {
            info!("no wallet provider detected");
            return Ok(false);
        }

        let accounts = match self.gateway.current_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                self.session
                    .emit(StatusKind::AuthorizationProbeFailed { error: err.report() });
                return Err(err);
            }
        };
        self.session.emit(StatusKind::ExistingAuthorization {
            accounts: accounts.clone(),
        });

        if accounts.is_empty() {
            info!("wallet has not authorized this client yet");
            return Ok(false);
        }

        info!(accounts = accounts.len(), "found existing authorization, connecting");
        self.session.connect().await?;
        Ok(true)
    }
}
