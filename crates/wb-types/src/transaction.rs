use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{ParseError, WalletAddress, parse_units};

/// A transfer as entered by the user, before any validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: String,
    pub value: String,
}

impl TransactionRequest {
    pub fn new(to: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            value: value.into(),
        }
    }

    /// Local-only validation: canonical recipient and a positive, exact
    /// base-unit amount.
    pub fn validate(&self, native_decimals: u8) -> Result<ValidatedTransfer, ParseError> {
        if self.to.trim().is_empty() {
            return Err(ParseError::Missing("recipient address"));
        }
        if self.value.trim().is_empty() {
            return Err(ParseError::Missing("amount"));
        }

        let to = WalletAddress::parse(&self.to)?;
        let value = parse_units(&self.value, native_decimals)?;
        if value.is_zero() {
            return Err(ParseError::NotPositive(self.value.clone()));
        }

        Ok(ValidatedTransfer { to, value })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub to: WalletAddress,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub block_number: u64,
    /// 1 on success, 0 on revert.
    pub status: u8,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    Validating,
    AwaitingWalletConfirmation,
    Submitted,
    Mined,
    Confirmed,
    Failed,
}

impl TxState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxState::Confirmed | TxState::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: Option<String>,
    pub state: TxState,
    pub block_number: Option<u64>,
    pub failure_reason: Option<String>,
}

impl TransactionRecord {
    pub fn validating() -> Self {
        Self {
            hash: None,
            state: TxState::Validating,
            block_number: None,
            failure_reason: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
