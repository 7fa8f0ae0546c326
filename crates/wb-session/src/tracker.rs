use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use wb_provider::{SharedGateway, WalletError, WalletResult};
use wb_types::{StatusKind, TransactionRecord, TransactionRequest, TxState};

use crate::WalletSession;

/// Drives one native transfer at a time from validation to confirmation.
///
/// Each state change is published on [`progress`](Self::progress) and to the
/// status reporter before the next step starts.
pub struct TransactionTracker {
    session: Arc<WalletSession>,
    gateway: SharedGateway,
    current: watch::Sender<Option<TransactionRecord>>,
}

struct Failure {
    error: WalletError,
    /// Whether the wallet saw the transfer, i.e. balances may have moved.
    reached_wallet: bool,
}

impl Failure {
    fn local(error: WalletError) -> Self {
        Self {
            error,
            reached_wallet: false,
        }
    }

    fn remote(error: WalletError) -> Self {
        Self {
            error,
            reached_wallet: true,
        }
    }
}

impl TransactionTracker {
    pub fn new(session: Arc<WalletSession>, gateway: SharedGateway) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            session,
            gateway,
            current,
        }
    }

    pub fn current(&self) -> Option<TransactionRecord> {
        self.current.borrow().clone()
    }

    pub fn progress(&self) -> watch::Receiver<Option<TransactionRecord>> {
        self.current.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|record| !record.is_terminal())
    }

    /// Validates and sends `request`, then follows it until it is confirmed
    /// or failed.
    ///
    /// Fails with [`WalletError::TransactionInFlight`] while an earlier send
    /// has not reached a terminal state. Dropping the returned future
    /// marks the record failed, so the tracker never stays busy.
    ///
    /// The record turns terminal before the closing snapshot refresh, so a
    /// new send may be claimed while that refresh is still running. Failures
    /// that never reached the wallet (invalid input, no session) skip the
    /// refresh.
    pub async fn send(&self, request: &TransactionRequest) -> WalletResult<TransactionRecord> {
        self.claim()?;
        let mut flight = Flight {
            tracker: self,
            landed: false,
        };

        let outcome = self.drive(request).await;
        flight.landed = true;

        match outcome {
            Ok(record) => {
                info!(hash = ?record.hash, block = ?record.block_number, "transaction confirmed");
                let _ = self.session.refresh_snapshot().await;
                Ok(record)
            }
            Err(Failure {
                error,
                reached_wallet,
            }) => {
                warn!("transaction failed: {error}");
                self.fail(error.to_string());
                if reached_wallet {
                    let _ = self.session.refresh_snapshot().await;
                }
                Err(error)
            }
        }
    }

    fn claim(&self) -> WalletResult<()> {
        let mut busy = false;
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|record| !record.is_terminal()) {
                busy = true;
                return false;
            }
            *current = Some(TransactionRecord::validating());
            true
        });

        if busy {
            let err = WalletError::TransactionInFlight;
            self.session.emit(StatusKind::TransactionRejected { error: err.report() });
            return Err(err);
        }
        self.publish();
        Ok(())
    }

    async fn drive(&self, request: &TransactionRequest) -> Result<TransactionRecord, Failure> {
        let mut record = TransactionRecord::validating();

        let transfer = request
            .validate(self.session.config().native_decimals)
            .map_err(|err| Failure::local(err.into()))?;
        let from = self
            .session
            .account()
            .ok_or_else(|| Failure::local(WalletError::NotConnected))?;

        record.state = TxState::AwaitingWalletConfirmation;
        self.store(&record);
        let hash = self
            .gateway
            .send_transaction(&from, &transfer)
            .await
            .map_err(Failure::remote)?;
        info!(%hash, to = %transfer.to, value = %transfer.value, "transaction submitted");

        record.state = TxState::Submitted;
        record.hash = Some(hash.clone());
        self.store(&record);

        let receipt = match self.session.config().receipt_timeout {
            Some(limit) => tokio::time::timeout(limit, self.gateway.wait_for_receipt(&hash))
                .await
                .map_err(|_| {
                    Failure::remote(WalletError::Cancelled(format!(
                        "no receipt for {hash} within {}s",
                        limit.as_secs()
                    )))
                })?,
            None => self.gateway.wait_for_receipt(&hash).await,
        }
        .map_err(Failure::remote)?;

        record.state = TxState::Mined;
        record.block_number = Some(receipt.block_number);
        self.store(&record);

        if !receipt.succeeded() {
            return Err(Failure::remote(WalletError::OnChainFailure {
                hash,
                block_number: receipt.block_number,
            }));
        }

        record.state = TxState::Confirmed;
        self.store(&record);
        Ok(record)
    }

    fn store(&self, record: &TransactionRecord) {
        self.current.send_replace(Some(record.clone()));
        self.publish();
    }

    fn fail(&self, reason: String) {
        self.current.send_modify(|current| {
            if let Some(record) = current.as_mut() {
                record.state = TxState::Failed;
                record.failure_reason = Some(reason);
            }
        });
        self.publish();
    }

    fn publish(&self) {
        if let Some(record) = self.current() {
            self.session.emit(StatusKind::Transaction { record });
        }
    }
}

/// Marks the record failed if the `send` future is dropped before it lands.
struct Flight<'a> {
    tracker: &'a TransactionTracker,
    landed: bool,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.landed && self.tracker.is_in_flight() {
            self.tracker.fail("cancelled before completion".to_owned());
        }
    }
}
