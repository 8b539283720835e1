//! Finsight Gateway Daemon
//!
//! A thin gateway wiring a JSON HTTP front end to an external LLM provider,
//! a persistent embedding cache, and a transaction vector index.
//!
//! # Usage
//!
//! ```bash
//! finsight-daemon start [--foreground] [--port PORT] [--db-path PATH] [--index-path PATH]
//! finsight-daemon stop
//! finsight-daemon status
//! finsight-daemon admin stats
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/finsight/config.toml)
//! 3. Environment variables (FINSIGHT_*)
//! 4. CLI flags
//!
//! The provider API key is read from OPENAI_API_KEY and is required.

use anyhow::Result;
use clap::Parser;

use finsight_daemon::{
    admin_stats, show_status, start_daemon, stop_daemon, AdminCommands, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            foreground,
            port,
            db_path,
            index_path,
        } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                port,
                db_path.as_deref(),
                index_path.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::Admin { db_path, command } => match command {
            AdminCommands::Stats => {
                admin_stats(cli.config.as_deref(), db_path.as_deref())?;
            }
        },
    }

    Ok(())
}
