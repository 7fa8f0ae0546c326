use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use wb_provider::{WalletError, WalletResult};

/// EIP-1193 provider error codes.
pub const USER_REJECTED: i64 = 4001;
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Thin JSON-RPC 2.0 client. Cheap to clone; clones share the transport and
/// the availability flag.
#[derive(Clone)]
pub(crate) struct RpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: Arc<AtomicU64>,
    available: Arc<AtomicBool>,
}

impl RpcClient {
    pub(crate) fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
            available: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    pub(crate) async fn call(&self, method: &str, params: Value, timeout: Duration) -> WalletResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "provider request");

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.transport_error(method, err))?;

        self.available.store(true, Ordering::Relaxed);

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: RpcResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(WalletError::Provider {
                    code: None,
                    message: format!("{method} HTTP {status}: {text}"),
                });
            }
            Err(err) => {
                return Err(WalletError::Provider {
                    code: None,
                    message: format!("{method} returned malformed response: {err}"),
                });
            }
        };

        if let Some(error) = body.error {
            return Err(map_rpc_error(error.code, error.message));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }

    fn transport_error(&self, method: &str, err: reqwest::Error) -> WalletError {
        if err.is_timeout() {
            return WalletError::Timeout(format!("{method} got no answer from the wallet"));
        }
        if err.is_connect() {
            warn!(method, "wallet endpoint unreachable: {err}");
            self.available.store(false, Ordering::Relaxed);
            return WalletError::NoProvider;
        }
        WalletError::Provider {
            code: None,
            message: format!("{method} transport: {err}"),
        }
    }
}

pub(crate) fn map_rpc_error(code: i64, message: String) -> WalletError {
    match code {
        USER_REJECTED => WalletError::UserRejected(message),
        UNRECOGNIZED_CHAIN => WalletError::UnrecognizedChain(message),
        _ if message.trim().is_empty() => WalletError::Provider {
            code: Some(code),
            message: "provider request failed".to_owned(),
        },
        _ => WalletError::Provider {
            code: Some(code),
            message,
        },
    }
}
