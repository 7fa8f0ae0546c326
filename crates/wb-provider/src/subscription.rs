use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use wb_types::WalletAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// An empty list means the user revoked access.
    AccountsChanged(Vec<WalletAddress>),
    ChainChanged(u64),
}

impl ProviderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::AccountsChanged(_) => "accounts_changed",
            ProviderEvent::ChainChanged(_) => "chain_changed",
        }
    }
}

/// Ordered stream of provider events.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// stops the producing task, if any.
pub struct ProviderSubscription {
    events: mpsc::UnboundedReceiver<ProviderEvent>,
    producer: Option<AbortHandle>,
}

impl ProviderSubscription {
    pub fn new(events: mpsc::UnboundedReceiver<ProviderEvent>, producer: Option<AbortHandle>) -> Self {
        Self { events, producer }
    }

    /// A subscription fed by the returned sender, with no producer task.
    pub fn channel() -> (mpsc::UnboundedSender<ProviderEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, None))
    }

    /// Next event, or `None` once the provider side has gone away.
    pub async fn next(&mut self) -> Option<ProviderEvent> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
        self.events.close();
    }
}

impl Drop for ProviderSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
