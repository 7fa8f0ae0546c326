use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{Network, TokenInfo, TransactionRecord, WalletAddress};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoProvider,
    UserRejected,
    Timeout,
    InvalidRequest,
    InvalidState,
    NotConnected,
    TransactionInFlight,
    UnrecognizedChain,
    OnChainFailure,
    TransientReadFailure,
    NoHolderAvailable,
    Cancelled,
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Local-only; wallets expose no call that revokes a site's authorization.
    UserRequested,
    AccountsRevoked,
    ConnectFailed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    Switched,
    Added,
}

/// Everything observable the core does, one variant per transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StatusKind {
    ProviderDetected {
        available: bool,
    },
    ExistingAuthorization {
        accounts: Vec<WalletAddress>,
    },
    AuthorizationProbeFailed {
        error: ErrorReport,
    },
    ConnectStarted,
    Connected {
        account: WalletAddress,
        network: Network,
    },
    ConnectFailed {
        error: ErrorReport,
    },
    Disconnected {
        reason: DisconnectReason,
    },
    AccountsChanged {
        accounts: Vec<WalletAddress>,
    },
    ChainChanged {
        chain_id: u64,
    },
    EventIgnored {
        event: String,
    },
    SnapshotRefreshed {
        account: WalletAddress,
        network: Network,
        balance: U256,
        display_balance: String,
    },
    RefreshSuperseded {
        ticket: u64,
    },
    RefreshFailed {
        error: ErrorReport,
    },
    Transaction {
        record: TransactionRecord,
    },
    TransactionRejected {
        error: ErrorReport,
    },
    NetworkSwitchRequested {
        chain_id: u64,
    },
    NetworkSwitched {
        chain_id: u64,
        outcome: SwitchOutcome,
    },
    NetworkSwitchFailed {
        chain_id: u64,
        error: ErrorReport,
    },
    TokenQueried {
        info: TokenInfo,
    },
    TokenQueryFailed {
        error: ErrorReport,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEvent {
    pub event_id: Uuid,
    pub timestamp_epoch_ms: u128,
    #[serde(flatten)]
    pub kind: StatusKind,
}

impl StatusEvent {
    pub fn now(kind: StatusKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp_epoch_ms: epoch_ms(),
            kind,
        }
    }
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
