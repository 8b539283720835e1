//! CLI argument parsing for the finsight daemon.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

/// Finsight Gateway Daemon
///
/// Financial-analysis gateway: news analysis, embedding-backed fraud
/// detection, and a chatbot, over externally hosted models.
#[derive(Parser, Debug)]
#[command(name = "finsight-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/finsight/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override embedding cache path
        #[arg(long)]
        db_path: Option<String>,

        /// Override vector index path
        #[arg(long)]
        index_path: Option<String>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status
    Status,

    /// Administrative commands
    Admin {
        /// Embedding cache path (default from config)
        #[arg(long)]
        db_path: Option<String>,

        #[command(subcommand)]
        command: AdminCommands,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Print embedding cache statistics
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        let cli = Cli::try_parse_from(["finsight-daemon", "start", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Start { port, .. } => assert_eq!(port, Some(9000)),
            _ => panic!("expected start command"),
        }
    }

    #[test]
    fn test_parse_admin_stats() {
        let cli =
            Cli::try_parse_from(["finsight-daemon", "admin", "--db-path", "/tmp/x.db", "stats"])
                .unwrap();
        match cli.command {
            Commands::Admin { db_path, command } => {
                assert_eq!(db_path.as_deref(), Some("/tmp/x.db"));
                assert!(matches!(command, AdminCommands::Stats));
            }
            _ => panic!("expected admin command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["finsight-daemon", "status", "--config", "custom.toml"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }
}
