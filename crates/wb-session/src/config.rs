use anyhow::{Context, Result};
use std::time::Duration;

/// Session-level settings.
///
/// `WALLET_NATIVE_DECIMALS` (18), `WALLET_NATIVE_SYMBOL` (`ETH`) and the
/// optional `WALLET_RECEIPT_TIMEOUT_SECS`. Without a receipt timeout a send
/// waits for inclusion for as long as the chain takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub native_decimals: u8,
    pub native_symbol: String,
    pub receipt_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            native_decimals: 18,
            native_symbol: "ETH".to_owned(),
            receipt_timeout: None,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let native_decimals = match std::env::var("WALLET_NATIVE_DECIMALS") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .with_context(|| format!("WALLET_NATIVE_DECIMALS must be 0-255, got '{raw}'"))?,
            _ => defaults.native_decimals,
        };

        let native_symbol = std::env::var("WALLET_NATIVE_SYMBOL")
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.native_symbol);

        let receipt_timeout = match std::env::var("WALLET_RECEIPT_TIMEOUT_SECS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("WALLET_RECEIPT_TIMEOUT_SECS must be an integer, got '{raw}'"))?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self {
            native_decimals,
            native_symbol,
            receipt_timeout,
        })
    }
}
