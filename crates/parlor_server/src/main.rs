//! Parlor - scripted replays and configuration checks.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use parlor_server::cli::{Cli, Command};
use parlor_server::{DEFAULT_FILTER, ReplayScript, ServerConfig, init_tracing, run_script};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_FILTER);

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            script,
            config,
            pretty,
        } => run_replay(&script, config, pretty).await,
        Command::CheckConfig { config } => check_config(&config).await,
    }
}

/// Play a script and print its outcomes
#[instrument(skip(config))]
async fn run_replay(script: &Path, config: Option<PathBuf>, pretty: bool) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let script: ReplayScript = serde_json::from_str(&text).context("Failed to parse script")?;

    let config = match config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let services = config.services().await?;

    let outcomes = run_script(&script, services).await;
    let json = if pretty {
        serde_json::to_string_pretty(&outcomes)?
    } else {
        serde_json::to_string(&outcomes)?
    };
    println!("{json}");
    Ok(())
}

/// Validate a config by building everything it describes
#[instrument]
async fn check_config(path: &Path) -> Result<()> {
    let config = ServerConfig::from_file(path)?;
    config.services().await?;
    info!("Configuration is usable");
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
