//! Command-line interface for strictly_matchmaker.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Matchmaker - two-player tic-tac-toe over WebSockets
#[derive(Parser, Debug)]
#[command(name = "strictly_matchmaker")]
#[command(about = "Matchmaking and live game-session server for tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed for starting-turn draws (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
