use std::sync::Arc;
use tracing::{info, warn};
use wb_provider::WalletResult;
use wb_session::WalletBridge;
use wb_types::TransactionRequest;

use crate::commands::{Command, HELP};

/// Runs one operator command to completion. Outcomes reach the operator
/// through the status stream; errors are only logged here.
pub(crate) async fn run(bridge: Arc<WalletBridge>, command: Command) {
    let name = format!("{command:?}");
    if let Err(err) = dispatch(&bridge, command).await {
        warn!(command = %name, "command failed: {err}");
    }
}

async fn dispatch(bridge: &WalletBridge, command: Command) -> WalletResult<()> {
    match command {
        Command::Connect => {
            bridge.session().connect().await?;
        }
        Command::Disconnect => bridge.session().disconnect(),
        Command::Refresh => bridge.session().refresh_snapshot().await?,
        Command::Status => {
            let snapshot = bridge.session().snapshot();
            let short = snapshot.account().map(|account| account.short());
            info!(
                state = ?snapshot.connection_state(),
                account = ?short,
                network = ?snapshot.network().map(|network| network.name.as_str()),
                in_flight = bridge.tracker().is_in_flight(),
                "session status"
            );
        }
        Command::SwitchSepolia => {
            bridge.switcher().switch_to_sepolia().await?;
        }
        Command::Send { to, amount } => {
            bridge
                .tracker()
                .send(&TransactionRequest::new(to, amount))
                .await?;
        }
        Command::Token { token, holder } => {
            bridge.query().token_info(&token, holder.as_deref()).await?;
        }
        Command::Help => eprintln!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}
