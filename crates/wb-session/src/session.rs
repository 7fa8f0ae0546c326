use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wb_provider::{ProviderEvent, ProviderSubscription, SharedGateway, WalletError, WalletResult};
use wb_types::{
    DisconnectReason, Network, StatusEvent, StatusKind, U256, WalletAddress, format_units,
};

use crate::SessionConfig;
use crate::reporter::SharedReporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Account view of a connected session. The balance stays `None` until the
/// first successful refresh for this account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedSession {
    pub account: WalletAddress,
    pub network: Network,
    pub balance: Option<U256>,
}

/// Published session snapshot. Account and network exist only while
/// connected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "connection_state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Disconnected,
    Connecting,
    Connected(ConnectedSession),
}

impl Session {
    pub fn connection_state(&self) -> ConnectionState {
        match self {
            Session::Disconnected => ConnectionState::Disconnected,
            Session::Connecting => ConnectionState::Connecting,
            Session::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn connected(&self) -> Option<&ConnectedSession> {
        match self {
            Session::Connected(connected) => Some(connected),
            _ => None,
        }
    }

    pub fn account(&self) -> Option<&WalletAddress> {
        self.connected().map(|c| &c.account)
    }

    pub fn network(&self) -> Option<&Network> {
        self.connected().map(|c| &c.network)
    }

    pub fn balance(&self) -> Option<U256> {
        self.connected().and_then(|c| c.balance)
    }
}

/// Ordering bookkeeping, always mutated together with the snapshot.
///
/// `generation` changes on every connect attempt and every reset so work
/// started under an older session can never write into a newer one.
/// Refresh tickets are issued on arrival; a result lands only if its ticket
/// is newer than the last one applied.
#[derive(Debug, Default)]
struct Ledger {
    generation: u64,
    next_ticket: u64,
    applied_ticket: u64,
}

/// Owns the connection lifecycle and the account/network snapshot.
///
/// Shared behind an `Arc`. Every mutation holds the ledger lock for the
/// duration of the write, so readers of [`subscribe`](Self::subscribe) only
/// ever see whole states.
pub struct WalletSession {
    gateway: SharedGateway,
    reporter: SharedReporter,
    config: SessionConfig,
    ledger: Mutex<Ledger>,
    state: watch::Sender<Session>,
}

impl WalletSession {
    pub fn new(gateway: SharedGateway, reporter: SharedReporter, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::Disconnected);
        Self {
            gateway,
            reporter,
            config,
            ledger: Mutex::new(Ledger::default()),
            state,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.borrow().connection_state()
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.state.borrow().account().copied()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn emit(&self, kind: StatusKind) {
        self.reporter.report(StatusEvent::now(kind));
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `apply` to the ledger and snapshot atomically. Subscribers
    /// are notified only when `apply` reports a change.
    fn transition(&self, apply: impl FnOnce(&mut Ledger, &mut Session) -> bool) {
        let mut ledger = self.ledger();
        self.state.send_if_modified(|session| apply(&mut *ledger, session));
    }

    /// Asks the wallet for account access and establishes the session.
    ///
    /// Only valid while disconnected. Whatever happens, the session never
    /// stays in `Connecting`: it ends connected or back at disconnected.
    pub async fn connect(&self) -> WalletResult<WalletAddress> {
        let mut attempt = None;
        self.transition(|ledger, session| {
            if !matches!(session, Session::Disconnected) {
                return false;
            }
            ledger.generation += 1;
            attempt = Some(ledger.generation);
            *session = Session::Connecting;
            true
        });

        let Some(generation) = attempt else {
            let err = WalletError::InvalidState(format!(
                "connect requires a disconnected session, current state is {:?}",
                self.connection_state()
            ));
            self.emit(StatusKind::ConnectFailed { error: err.report() });
            return Err(err);
        };

        self.emit(StatusKind::ConnectStarted);
        let _attempt = ConnectAttempt {
            session: self,
            generation,
        };

        match self.establish().await {
            Ok((account, network)) => {
                let mut current = false;
                self.transition(|ledger, session| {
                    if ledger.generation != generation || !matches!(session, Session::Connecting) {
                        return false;
                    }
                    current = true;
                    *session = Session::Connected(ConnectedSession {
                        account,
                        network: network.clone(),
                        balance: None,
                    });
                    true
                });

                if !current {
                    let err = WalletError::Cancelled("session was reset while connecting".to_owned());
                    self.emit(StatusKind::ConnectFailed { error: err.report() });
                    return Err(err);
                }

                info!(account = %account, chain_id = network.chain_id, "wallet connected");
                self.emit(StatusKind::Connected { account, network });
                // Read failures are reported by the refresh itself and leave
                // the session connected.
                let _ = self.refresh_snapshot().await;
                Ok(account)
            }
            Err(err) => {
                let reset = self.abandon_connect(generation);

                info!("wallet connect failed: {err}");
                self.emit(StatusKind::ConnectFailed { error: err.report() });
                if reset {
                    self.emit(StatusKind::Disconnected {
                        reason: DisconnectReason::ConnectFailed,
                    });
                }
                Err(err)
            }
        }
    }

    /// Falls back to disconnected if the attempt `generation` is still the
    /// one in `Connecting`. Returns whether it did.
    fn abandon_connect(&self, generation: u64) -> bool {
        let mut reset = false;
        self.transition(|ledger, session| {
            if ledger.generation != generation || !matches!(session, Session::Connecting) {
                return false;
            }
            ledger.generation += 1;
            *session = Session::Disconnected;
            reset = true;
            true
        });
        reset
    }

    async fn establish(&self) -> WalletResult<(WalletAddress, Network)> {
        let accounts = self.gateway.request_accounts().await?;
        let account = accounts.first().copied().ok_or_else(|| WalletError::Provider {
            code: None,
            message: "wallet returned no accounts".to_owned(),
        })?;
        let network = self.gateway.network().await?;
        Ok((account, network))
    }

    /// Forgets the session locally.
    ///
    /// Wallets offer no call that revokes a site's access, so the wallet
    /// still considers this client authorized afterwards; a later
    /// `connect` may succeed without a prompt.
    pub fn disconnect(&self) {
        self.reset(DisconnectReason::UserRequested);
    }

    fn reset(&self, reason: DisconnectReason) {
        self.transition(|ledger, session| {
            ledger.generation += 1;
            let changed = !matches!(session, Session::Disconnected);
            *session = Session::Disconnected;
            changed
        });
        info!(?reason, "wallet session cleared (local state only)");
        self.emit(StatusKind::Disconnected { reason });
    }

    /// Re-reads network and balance and republishes the snapshot.
    ///
    /// Returns immediately with `Ok` when not connected. A failed read is
    /// reported and returned as [`WalletError::TransientReadFailure`]; the
    /// session stays connected.
    pub async fn refresh_snapshot(&self) -> WalletResult<()> {
        let mut issued = None;
        self.transition(|ledger, session| {
            if let Session::Connected(connected) = session {
                ledger.next_ticket += 1;
                issued = Some((ledger.next_ticket, ledger.generation, connected.account));
            }
            false
        });

        let Some((ticket, generation, account)) = issued else {
            debug!("refresh skipped, session not connected");
            return Ok(());
        };

        let reads = tokio::try_join!(self.gateway.network(), self.gateway.balance(&account));
        let (network, balance) = match reads {
            Ok(reads) => reads,
            Err(err) => {
                let err = err.into_read_failure();
                self.emit(StatusKind::RefreshFailed { error: err.report() });
                return Err(err);
            }
        };

        let mut applied = false;
        self.transition(|ledger, session| {
            let Session::Connected(connected) = session else {
                return false;
            };
            if ledger.generation != generation
                || ticket <= ledger.applied_ticket
                || connected.account != account
            {
                return false;
            }
            ledger.applied_ticket = ticket;
            connected.network = network.clone();
            connected.balance = Some(balance);
            applied = true;
            true
        });

        if applied {
            let display_balance = format!(
                "{} {}",
                format_units(balance, self.config.native_decimals),
                self.config.native_symbol
            );
            self.emit(StatusKind::SnapshotRefreshed {
                account,
                network,
                balance,
                display_balance,
            });
        } else {
            debug!(ticket, "refresh superseded by newer state");
            self.emit(StatusKind::RefreshSuperseded { ticket });
        }
        Ok(())
    }

    /// Applies one provider event. Events that arrive while not connected
    /// are reported and otherwise ignored.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                self.emit(StatusKind::AccountsChanged {
                    accounts: accounts.clone(),
                });
                self.on_accounts_changed(accounts).await;
            }
            ProviderEvent::ChainChanged(chain_id) => {
                self.emit(StatusKind::ChainChanged { chain_id });
                if self.connection_state() != ConnectionState::Connected {
                    self.ignored("chain_changed");
                    return;
                }
                // The wallet follows the chain switch by itself; a refresh
                // picks up the new network and the balance on it.
                let _ = self.refresh_snapshot().await;
            }
        }
    }

    async fn on_accounts_changed(&self, accounts: Vec<WalletAddress>) {
        let Some(first) = accounts.first().copied() else {
            if self.connection_state() == ConnectionState::Connected {
                self.reset(DisconnectReason::AccountsRevoked);
            } else {
                self.ignored("accounts_changed");
            }
            return;
        };

        let mut connected = false;
        self.transition(|_, session| {
            let Session::Connected(current) = session else {
                return false;
            };
            connected = true;
            if current.account == first {
                return false;
            }
            current.account = first;
            current.balance = None;
            true
        });

        if !connected {
            self.ignored("accounts_changed");
            return;
        }
        let _ = self.refresh_snapshot().await;
    }

    fn ignored(&self, event: &str) {
        debug!(event, "provider event ignored, session not connected");
        self.emit(StatusKind::EventIgnored {
            event: event.to_owned(),
        });
    }

    /// Consumes provider events one at a time, in delivery order, until the
    /// subscription ends.
    pub async fn pump_events(&self, mut subscription: ProviderSubscription) {
        while let Some(event) = subscription.next().await {
            debug!(event = event.name(), "provider event");
            self.handle_event(event).await;
        }
        debug!("provider subscription closed");
    }

    /// Subscribes to the provider and runs the event pump on its own task.
    /// Aborting the returned handle drops the subscription, which
    /// unsubscribes.
    pub fn spawn_event_pump(self: &Arc<Self>) -> JoinHandle<()> {
        let subscription = self.gateway.subscribe();
        let session = Arc::clone(self);
        tokio::spawn(async move { session.pump_events(subscription).await })
    }
}

/// Keeps an abandoned `connect` future (dropped mid-prompt) from leaving the
/// session stuck in `Connecting`.
struct ConnectAttempt<'a> {
    session: &'a WalletSession,
    generation: u64,
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        self.session.abandon_connect(self.generation);
    }
}
