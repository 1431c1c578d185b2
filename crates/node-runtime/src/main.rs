//! # XChain Node
//!
//! Bridges on-ramp offers from an EVM source chain into storage deals on
//! the destination chain.
//!
//! ```text
//! xchain-node daemon --config ./config/config.toml --chain calibration
//! ```
//!
//! Secrets are read from the environment: `XC_SIGNER_KEY` (required),
//! `XC_LIGHTHOUSE_API_KEY` (required while uploads are enabled) and
//! `XC_LOTUS_TOKEN` (optional).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use xchain_telemetry::{init_telemetry, TelemetryConfig};

use node_runtime::{NodeConfig, NodeRuntime, Secrets, SubsystemContainer};

#[derive(Parser)]
#[command(name = "xchain-node")]
#[command(about = "Cross-chain data bridge into Filecoin storage deals", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the on-ramp, aggregate offers and make deals
    Daemon {
        /// Configuration file
        #[arg(short, long, env = "XC_CONFIG", default_value = "./config/config.toml")]
        config: PathBuf,

        /// Source chain to watch, a `[sources.<name>]` section
        #[arg(long)]
        chain: String,

        /// Log level override
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Daemon {
            config,
            chain,
            log_level,
        } => daemon(config, chain, log_level).await,
    }
}

async fn daemon(path: PathBuf, chain: String, log_level: Option<String>) -> Result<()> {
    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = log_level {
        telemetry = telemetry.with_log_level(level);
    }
    let _telemetry = init_telemetry(telemetry)
        .await
        .context("failed to initialize telemetry")?;

    let config = NodeConfig::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let secrets = Secrets::from_env()?;
    let container = SubsystemContainer::build(&config, &chain, &secrets)
        .with_context(|| format!("failed to set up chain {chain:?}"))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "[node] Could not listen for Ctrl-C");
            return;
        }
        info!("[node] Ctrl-C received, shutting down");
        on_signal.cancel();
    });

    info!(config = %path.display(), chain = %chain, "[node] Node is running. Press Ctrl+C to stop.");
    NodeRuntime::new(container)
        .run(cancel)
        .await
        .context("xchain node stopped on a fatal error")
}
