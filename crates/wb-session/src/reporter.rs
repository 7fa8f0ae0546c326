use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wb_types::{StatusEvent, StatusKind};

/// One-way observation channel for the presentation layer.
pub trait StatusReporter: Send + Sync {
    fn report(&self, event: StatusEvent);
}

pub type SharedReporter = Arc<dyn StatusReporter>;

/// Writes every status event as a structured `tracing` record.
#[derive(Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, event: StatusEvent) {
        let payload = serde_json::to_string(&event.kind).unwrap_or_default();
        if is_failure(&event.kind) {
            warn!(
                event_id = %event.event_id,
                timestamp_epoch_ms = event.timestamp_epoch_ms as u64,
                %payload,
                "wallet status"
            );
        } else {
            info!(
                event_id = %event.event_id,
                timestamp_epoch_ms = event.timestamp_epoch_ms as u64,
                %payload,
                "wallet status"
            );
        }
    }
}

fn is_failure(kind: &StatusKind) -> bool {
    matches!(
        kind,
        StatusKind::AuthorizationProbeFailed { .. }
            | StatusKind::ConnectFailed { .. }
            | StatusKind::RefreshFailed { .. }
            | StatusKind::TransactionRejected { .. }
            | StatusKind::NetworkSwitchFailed { .. }
            | StatusKind::TokenQueryFailed { .. }
    )
}

/// Forwards events into an unbounded channel, e.g. for a UI task.
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelReporter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusReporter for ChannelReporter {
    fn report(&self, event: StatusEvent) {
        // A closed receiver means nobody is rendering anymore.
        let _ = self.tx.send(event);
    }
}

/// Delivers each event to every inner reporter, in order.
pub struct FanoutReporter {
    reporters: Vec<SharedReporter>,
}

impl FanoutReporter {
    pub fn new(reporters: Vec<SharedReporter>) -> Self {
        Self { reporters }
    }
}

impl StatusReporter for FanoutReporter {
    fn report(&self, event: StatusEvent) {
        if let Some((last, rest)) = self.reporters.split_last() {
            for reporter in rest {
                reporter.report(event.clone());
            }
            last.report(event);
        }
    }
}
