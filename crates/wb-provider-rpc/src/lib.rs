mod abi;
mod config;
mod rpc;
mod watcher;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_PROVIDER_URL, GatewayConfig};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use wb_provider::{ProviderGateway, ProviderSubscription, WalletError, WalletResult};
use wb_types::{
    Network, NetworkDescriptor, Receipt, U256, ValidatedTransfer, WalletAddress, chain_id_hex,
    parse_chain_id,
};

use crate::rpc::RpcClient;

/// Wallet provider reached over JSON-RPC, speaking the EIP-1193 method set
/// (`eth_requestAccounts`, `wallet_switchEthereumChain`, ...).
///
/// Construct with [`JsonRpcGateway::detect`], which fails with
/// [`WalletError::NoProvider`] when nothing answers at the endpoint.
pub struct JsonRpcGateway {
    config: GatewayConfig,
    rpc: RpcClient,
}

impl JsonRpcGateway {
    pub async fn detect(config: GatewayConfig) -> WalletResult<Self> {
        let gateway = Self::new(config);
        let chain_id = gateway.chain_id().await?;
        info!(endpoint = %gateway.config.endpoint, chain_id, "wallet provider detected");
        Ok(gateway)
    }

    /// Builds the gateway without probing. [`ProviderGateway::is_available`]
    /// stays false until the first request gets through.
    pub fn new(config: GatewayConfig) -> Self {
        let rpc = RpcClient::new(config.endpoint.clone());
        Self { config, rpc }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn read(&self, method: &str, params: Value) -> WalletResult<Value> {
        self.rpc.call(method, params, self.config.read_timeout).await
    }

    async fn prompt(&self, method: &str, params: Value) -> WalletResult<Value> {
        self.rpc.call(method, params, self.config.request_timeout).await
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        let value = self.read("eth_chainId", json!([])).await?;
        parse_chain_id_value(&value)
    }

    async fn eth_call(&self, token: &WalletAddress, data: String) -> WalletResult<Vec<u8>> {
        let value = self
            .read("eth_call", json!([{ "to": token.to_string(), "data": data }, "latest"]))
            .await?;
        let raw = value.as_str().ok_or_else(|| malformed("eth_call", &value))?;
        abi::decode_hex(raw).map_err(|message| WalletError::Provider { code: None, message })
    }
}

#[async_trait]
impl ProviderGateway for JsonRpcGateway {
    fn is_available(&self) -> bool {
        self.rpc.is_available()
    }

    async fn request_accounts(&self) -> WalletResult<Vec<WalletAddress>> {
        let value = self.prompt("eth_requestAccounts", json!([])).await?;
        parse_accounts(&value)
    }

    async fn current_accounts(&self) -> WalletResult<Vec<WalletAddress>> {
        let value = self.read("eth_accounts", json!([])).await?;
        parse_accounts(&value)
    }

    async fn network(&self) -> WalletResult<Network> {
        Ok(Network::from_chain_id(self.chain_id().await?))
    }

    async fn balance(&self, account: &WalletAddress) -> WalletResult<U256> {
        let value = self
            .read("eth_getBalance", json!([account.to_string(), "latest"]))
            .await?;
        parse_quantity("eth_getBalance", &value)
    }

    async fn send_transaction(
        &self,
        from: &WalletAddress,
        transfer: &ValidatedTransfer,
    ) -> WalletResult<String> {
        let tx = json!({
            "from": from.to_string(),
            "to": transfer.to.to_string(),
            "value": format!("0x{:x}", transfer.value),
        });
        let value = self.prompt("eth_sendTransaction", json!([tx])).await?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| malformed("eth_sendTransaction", &value))
    }

    /// Polls until the receipt appears. A slow or failing poll does not end
    /// the wait, the transfer is already broadcast; only a vanished
    /// provider or cancellation does.
    async fn wait_for_receipt(&self, hash: &str) -> WalletResult<Receipt> {
        let mut ticker = tokio::time::interval(self.config.receipt_poll_interval);
        loop {
            ticker.tick().await;
            let value = match self.read("eth_getTransactionReceipt", json!([hash])).await {
                Ok(value) => value,
                Err(err @ (WalletError::NoProvider | WalletError::Cancelled(_))) => return Err(err),
                Err(err) => {
                    warn!(hash, "receipt poll failed, retrying: {err}");
                    continue;
                }
            };
            if value.is_null() {
                debug!(hash, "receipt not available yet");
                continue;
            }
            return parse_receipt(&value);
        }
    }

    async fn switch_network(&self, chain_id: u64) -> WalletResult<()> {
        self.prompt(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id_hex(chain_id) }]),
        )
        .await?;
        Ok(())
    }

    async fn add_network(&self, descriptor: &NetworkDescriptor) -> WalletResult<()> {
        let params = json!([{
            "chainId": chain_id_hex(descriptor.chain_id),
            "chainName": descriptor.display_name,
            "nativeCurrency": {
                "name": descriptor.native_currency.name,
                "symbol": descriptor.native_currency.symbol,
                "decimals": descriptor.native_currency.decimals,
            },
            "rpcUrls": descriptor.rpc_endpoints,
            "blockExplorerUrls": descriptor.explorer_endpoints,
        }]);
        self.prompt("wallet_addEthereumChain", params).await?;
        Ok(())
    }

    async fn token_symbol(&self, token: &WalletAddress) -> WalletResult<String> {
        let data = self.eth_call(token, abi::encode_call(abi::SYMBOL)).await?;
        abi::decode_string(&data).map_err(|message| WalletError::Provider { code: None, message })
    }

    async fn token_decimals(&self, token: &WalletAddress) -> WalletResult<u8> {
        let data = self.eth_call(token, abi::encode_call(abi::DECIMALS)).await?;
        abi::decode_u8(&data).map_err(|message| WalletError::Provider { code: None, message })
    }

    async fn token_balance(&self, token: &WalletAddress, holder: &WalletAddress) -> WalletResult<U256> {
        let data = self.eth_call(token, abi::encode_balance_of(holder)).await?;
        abi::decode_uint(&data).map_err(|message| WalletError::Provider { code: None, message })
    }

    fn subscribe(&self) -> ProviderSubscription {
        watcher::spawn(
            self.rpc.clone(),
            self.config.poll_interval,
            self.config.read_timeout,
        )
    }
}

fn malformed(method: &str, value: &Value) -> WalletError {
    WalletError::Provider {
        code: None,
        message: format!("{method} returned unexpected payload: {value}"),
    }
}

pub(crate) fn parse_accounts(value: &Value) -> WalletResult<Vec<WalletAddress>> {
    let entries = value
        .as_array()
        .ok_or_else(|| malformed("accounts", value))?;
    entries
        .iter()
        .map(|entry| {
            let raw = entry.as_str().ok_or_else(|| malformed("accounts", entry))?;
            WalletAddress::parse(raw).map_err(|err| WalletError::Provider {
                code: None,
                message: err.to_string(),
            })
        })
        .collect()
}

pub(crate) fn parse_chain_id_value(value: &Value) -> WalletResult<u64> {
    value
        .as_str()
        .and_then(parse_chain_id)
        .or_else(|| value.as_u64())
        .ok_or_else(|| malformed("eth_chainId", value))
}

fn parse_quantity(method: &str, value: &Value) -> WalletResult<U256> {
    let raw = value.as_str().ok_or_else(|| malformed(method, value))?;
    let hex = raw.trim_start_matches("0x");
    if hex.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(hex, 16).map_err(|_| malformed(method, value))
}

/// Receipts from before Byzantium carry `root` instead of `status`; those
/// count as successful, inclusion being the only signal they give.
fn parse_receipt(value: &Value) -> WalletResult<Receipt> {
    let block_number = parse_quantity("eth_getTransactionReceipt", &value["blockNumber"])?;
    let status = match &value["status"] {
        Value::Null => 1,
        status => {
            let status = parse_quantity("eth_getTransactionReceipt", status)?;
            if status.is_zero() { 0 } else { 1 }
        }
    };
    Ok(Receipt {
        block_number: u64::try_from(block_number)
            .map_err(|_| malformed("eth_getTransactionReceipt", value))?,
        status,
    })
}
