use std::sync::Arc;
use tracing::debug;
use wb_provider::{SharedGateway, WalletError, WalletResult};
use wb_types::{StatusKind, TokenInfo, WalletAddress, format_units};

use crate::WalletSession;

/// Stateless token reads against whatever network the wallet is on.
pub struct TokenQuery {
    session: Arc<WalletSession>,
    gateway: SharedGateway,
}

impl TokenQuery {
    pub fn new(session: Arc<WalletSession>, gateway: SharedGateway) -> Self {
        Self { session, gateway }
    }

    /// Symbol, decimals and the holder's balance of `token`.
    ///
    /// `holder` falls back to the connected account when absent or blank.
    pub async fn token_info(&self, token: &str, holder: Option<&str>) -> WalletResult<TokenInfo> {
        match self.read(token, holder).await {
            Ok(info) => {
                self.session.emit(StatusKind::TokenQueried { info: info.clone() });
                Ok(info)
            }
            Err(err) => {
                self.session.emit(StatusKind::TokenQueryFailed { error: err.report() });
                Err(err)
            }
        }
    }

    async fn read(&self, token: &str, holder: Option<&str>) -> WalletResult<TokenInfo> {
        if token.trim().is_empty() {
            return Err(WalletError::InvalidRequest("token address is required".to_owned()));
        }
        let token = WalletAddress::parse(token)?;
        let holder = match holder.map(str::trim).filter(|h| !h.is_empty()) {
            Some(explicit) => WalletAddress::parse(explicit)?,
            None => self.session.account().ok_or(WalletError::NoHolderAvailable)?,
        };

        debug!(token = %token, holder = %holder, "querying token");
        let (symbol, decimals, raw_balance) = tokio::try_join!(
            self.gateway.token_symbol(&token),
            self.gateway.token_decimals(&token),
            self.gateway.token_balance(&token, &holder),
        )?;

        Ok(TokenInfo {
            token,
            holder,
            symbol,
            decimals,
            raw_balance,
            balance: format_units(raw_balance, decimals),
        })
    }
}
