use thiserror::Error;
use wb_types::{ErrorKind, ErrorReport, ParseError};

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("no wallet provider detected; install or enable a wallet")]
    NoProvider,
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),
    #[error("wallet did not respond in time: {0}")]
    Timeout(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("operation not valid in current session state: {0}")]
    InvalidState(String),
    #[error("no connected session")]
    NotConnected,
    #[error("a transaction is already in flight")]
    TransactionInFlight,
    #[error("chain not registered with wallet: {0}")]
    UnrecognizedChain(String),
    #[error("transaction {hash} reverted in block {block_number}")]
    OnChainFailure { hash: String, block_number: u64 },
    #[error("read failed: {0}")]
    TransientReadFailure(String),
    #[error("no holder address given and no connected account")]
    NoHolderAvailable,
    #[error("operation cancelled: {0}")]
    Cancelled(String),
    #[error("provider error{}: {message}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
    Provider { code: Option<i64>, message: String },
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NoProvider => ErrorKind::NoProvider,
            WalletError::UserRejected(_) => ErrorKind::UserRejected,
            WalletError::Timeout(_) => ErrorKind::Timeout,
            WalletError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            WalletError::InvalidState(_) => ErrorKind::InvalidState,
            WalletError::NotConnected => ErrorKind::NotConnected,
            WalletError::TransactionInFlight => ErrorKind::TransactionInFlight,
            WalletError::UnrecognizedChain(_) => ErrorKind::UnrecognizedChain,
            WalletError::OnChainFailure { .. } => ErrorKind::OnChainFailure,
            WalletError::TransientReadFailure(_) => ErrorKind::TransientReadFailure,
            WalletError::NoHolderAvailable => ErrorKind::NoHolderAvailable,
            WalletError::Cancelled(_) => ErrorKind::Cancelled,
            WalletError::Provider { .. } => ErrorKind::Provider,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    /// Reclassifies a failed read so callers can tell it apart from a
    /// failure that should end the operation. Provider absence and
    /// cancellation keep their identity.
    pub fn into_read_failure(self) -> Self {
        match self {
            WalletError::NoProvider
            | WalletError::Cancelled(_)
            | WalletError::TransientReadFailure(_) => self,
            other => WalletError::TransientReadFailure(other.to_string()),
        }
    }
}

impl From<ParseError> for WalletError {
    fn from(err: ParseError) -> Self {
        WalletError::InvalidRequest(err.to_string())
    }
}
