//! Strictly Matchmaker - server binary
//!
//! Loads configuration, initialises tracing and serves the WebSocket gateway.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_matchmaker::{ServerConfig, serve, shared_arena};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            seed,
        } => {
            let config = ServerConfig::load(config.as_deref())?.with_overrides(host, port, seed);
            run_server(config).await
        }
        Command::Config { config } => print_config(config),
    }
}

/// Run the WebSocket game server
#[instrument(skip_all, fields(addr = %config.bind_address()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(seeded = config.seed().is_some(), "Starting Strictly Matchmaker");

    let arena = shared_arena(*config.seed());
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    serve(listener, arena).await?;

    Ok(())
}

/// Print the effective configuration
fn print_config(path: Option<PathBuf>) -> Result<()> {
    let config = ServerConfig::load(path.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}
