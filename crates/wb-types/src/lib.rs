//! Shared vocabulary of the wallet bridge: canonical addresses, networks,
//! unit conversion, transaction records and the outward status events.

mod address;
mod network;
mod status;
mod transaction;
mod units;

pub use alloy_primitives::U256;

pub use address::WalletAddress;
pub use network::{
    MAINNET_CHAIN_ID, NativeCurrency, Network, NetworkDescriptor, SEPOLIA_CHAIN_ID, chain_id_hex,
    known_network_name, parse_chain_id,
};
pub use status::{DisconnectReason, ErrorKind, ErrorReport, StatusEvent, StatusKind, SwitchOutcome};
pub use transaction::{Receipt, TransactionRecord, TransactionRequest, TxState, ValidatedTransfer};
pub use units::{format_units, parse_units};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("address checksum mismatch: {0}")]
    BadChecksum(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount must be greater than zero: {0}")]
    NotPositive(String),
    #[error("amount {amount} has more than {decimals} fractional digits")]
    PrecisionLoss { amount: String, decimals: u8 },
    #[error("amount does not fit in 256 bits: {0}")]
    Overflow(String),
    #[error("{0} is required")]
    Missing(&'static str),
}

/// One token read: metadata plus the holder's balance in both forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub token: WalletAddress,
    pub holder: WalletAddress,
    pub symbol: String,
    pub decimals: u8,
    pub raw_balance: U256,
    pub balance: String,
}
