//! QuotePilot — follow-up outreach automation for sent estimates.
//!
//! Usage:
//!   quotepilot                     # Start the gateway (default port 8790)
//!   quotepilot --port 9000         # Custom port
//!   quotepilot --config ./qp.toml  # Explicit config file

use anyhow::Result;
use clap::Parser;
use quotepilot_core::config::QuotePilotConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotepilot",
    version,
    about = "Follow-up outreach automation for sent-but-unpaid estimates"
)]
struct Cli {
    /// Path to config file (default: ~/.quotepilot/config.toml)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Override the gateway bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the gateway bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "quotepilot=debug,tower_http=debug"
    } else {
        "quotepilot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = QuotePilotConfig::load_from(path)?;
            config.apply_env_overrides();
            config
        }
        None => QuotePilotConfig::load()?,
    };
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    if let Some(parent) = config.db_path().parent() {
        std::fs::create_dir_all(parent)?;
    }

    quotepilot_gateway::start(&config).await
}
