use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_PROVIDER_URL: &str = "http://localhost:8545";

/// Connection settings for the JSON-RPC wallet endpoint.
///
/// Read from the environment at construction time:
///
/// | variable                       | default                  |
/// |--------------------------------|--------------------------|
/// | `WALLET_PROVIDER_URL`          | `http://localhost:8545`  |
/// | `WALLET_REQUEST_TIMEOUT_SECS`  | `120` (consent prompts)  |
/// | `WALLET_READ_TIMEOUT_SECS`     | `15`                     |
/// | `WALLET_POLL_INTERVAL_MS`      | `1000` (event watcher)   |
/// | `WALLET_RECEIPT_POLL_MS`       | `2000`                   |
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
    pub read_timeout: Duration,
    pub poll_interval: Duration,
    pub receipt_poll_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PROVIDER_URL.to_owned(),
            request_timeout: Duration::from_secs(120),
            read_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(1000),
            receipt_poll_interval: Duration::from_millis(2000),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let endpoint = std::env::var("WALLET_PROVIDER_URL").unwrap_or(defaults.endpoint);

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            request_timeout: env_duration("WALLET_REQUEST_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.request_timeout),
            read_timeout: env_duration("WALLET_READ_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.read_timeout),
            poll_interval: env_duration("WALLET_POLL_INTERVAL_MS", Duration::from_millis)?
                .unwrap_or(defaults.poll_interval),
            receipt_poll_interval: env_duration("WALLET_RECEIPT_POLL_MS", Duration::from_millis)?
                .unwrap_or(defaults.receipt_poll_interval),
        })
    }
}

fn env_duration(name: &str, unit: fn(u64) -> Duration) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{name} must be a non-negative integer, got '{raw}'"))?;
            Ok(Some(unit(value)))
        }
        _ => Ok(None),
    }
}
