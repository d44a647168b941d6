//! DebateBrawl client - command-line entry point.
//!
//! Loads configuration, installs tracing, and runs one subcommand against
//! the configured backend.

mod commands;
mod console;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use brawl_application::Bootstrapper;
use brawl_infrastructure::AppConfig;

use crate::commands::Commands;

static SERVICES: Bootstrapper = Bootstrapper::new();

#[derive(Debug, Parser)]
#[command(name = "brawl")]
#[command(about = "DebateBrawl client")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./brawl.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    tracing::debug!("brawl v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = cli.command.execute(config, &SERVICES).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }

    Ok(())
}
