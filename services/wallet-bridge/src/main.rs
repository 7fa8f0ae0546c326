mod commands;
mod ops;

use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use wb_provider::{SharedGateway, WalletError};
use wb_provider_rpc::{GatewayConfig, JsonRpcGateway};
use wb_session::{
    ChannelReporter, FanoutReporter, SessionConfig, SharedReporter, TracingReporter, WalletBridge,
};
use wb_types::StatusEvent;

use crate::commands::{Command, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the status stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let gateway_config = GatewayConfig::from_env().context("invalid provider configuration")?;
    let session_config = SessionConfig::from_env().context("invalid session configuration")?;

    let endpoint = gateway_config.endpoint.clone();
    let gateway: SharedGateway = Arc::new(probe_gateway(gateway_config).await);

    let (channel, events) = ChannelReporter::channel();
    let reporter: SharedReporter = Arc::new(FanoutReporter::new(vec![
        Arc::new(TracingReporter),
        Arc::new(channel),
    ]));
    let printer = tokio::spawn(print_events(events));

    let bridge = Arc::new(WalletBridge::new(gateway, reporter, session_config));
    if let Err(err) = bridge.resume().await {
        warn!("could not check existing wallet authorization: {err}");
    }
    let pump = bridge.session().spawn_event_pump();

    info!(%endpoint, "wallet-bridge ready");
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                tokio::spawn(ops::run(Arc::clone(&bridge), command));
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    pump.abort();
    drop(bridge);
    // In-flight commands still hold the reporter; stop waiting on them.
    printer.abort();
    info!("wallet-bridge stopped");
    Ok(())
}

/// Probes the provider, falling back to an unprobed gateway on any failure.
/// A provider problem fails single commands, never the process.
async fn probe_gateway(config: GatewayConfig) -> JsonRpcGateway {
    let endpoint = config.endpoint.clone();
    match JsonRpcGateway::detect(config.clone()).await {
        Ok(gateway) => gateway,
        Err(WalletError::NoProvider) => {
            warn!(%endpoint, "no wallet provider answered, commands will fail until it does");
            JsonRpcGateway::new(config)
        }
        Err(err) => {
            warn!(%endpoint, "wallet provider probe failed: {err}");
            JsonRpcGateway::new(config)
        }
    }
}

/// Writes each status event to stdout as one JSON line.
async fn print_events(mut events: mpsc::UnboundedReceiver<StatusEvent>) {
    let mut stdout = tokio::io::stdout();
    while let Some(event) = events.recv().await {
        let Ok(mut line) = serde_json::to_vec(&event) else {
            continue;
        };
        line.push(b'\n');
        if stdout.write_all(&line).await.is_err() || stdout.flush().await.is_err() {
            break;
        }
    }
}
