//! Capability boundary between the bridge and a wallet provider.
//!
//! Everything the session core knows about a wallet goes through
//! [`ProviderGateway`]. Adapters translate their transport's failures into
//! [`WalletError`] so the core can tell a user rejection from a missing
//! provider from an unknown chain without inspecting raw codes.

mod error;
mod subscription;

pub use error::{WalletError, WalletResult};
pub use subscription::{ProviderEvent, ProviderSubscription};

use async_trait::async_trait;
use std::sync::Arc;
use wb_types::{Network, NetworkDescriptor, Receipt, U256, ValidatedTransfer, WalletAddress};

#[async_trait]
pub trait ProviderGateway: Send + Sync {
    fn is_available(&self) -> bool;

    /// Prompts the user for account access.
    async fn request_accounts(&self) -> WalletResult<Vec<WalletAddress>>;

    /// Accounts already authorized for this client, without prompting.
    async fn current_accounts(&self) -> WalletResult<Vec<WalletAddress>>;

    async fn network(&self) -> WalletResult<Network>;

    async fn balance(&self, account: &WalletAddress) -> WalletResult<U256>;

    /// Hands the transfer to the wallet for signing and broadcast; resolves
    /// with the transaction hash once the user approves.
    async fn send_transaction(
        &self,
        from: &WalletAddress,
        transfer: &ValidatedTransfer,
    ) -> WalletResult<String>;

    /// Resolves once the transaction is included in a block. No upper bound.
    async fn wait_for_receipt(&self, hash: &str) -> WalletResult<Receipt>;

    /// Fails with [`WalletError::UnrecognizedChain`] when the wallet does
    /// not know `chain_id`.
    async fn switch_network(&self, chain_id: u64) -> WalletResult<()>;

    async fn add_network(&self, descriptor: &NetworkDescriptor) -> WalletResult<()>;

    async fn token_symbol(&self, token: &WalletAddress) -> WalletResult<String>;

    async fn token_decimals(&self, token: &WalletAddress) -> WalletResult<u8>;

    async fn token_balance(&self, token: &WalletAddress, holder: &WalletAddress) -> WalletResult<U256>;

    /// Starts delivering account and chain changes in provider order.
    fn subscribe(&self) -> ProviderSubscription;
}

pub type SharedGateway = Arc<dyn ProviderGateway>;
