//! Command implementations for the finsight daemon.
//!
//! Handles:
//! - start: load config, read API key, open cache, load index, serve HTTP
//! - stop: signal running daemon to stop (via PID file)
//! - status: check if daemon is running
//! - admin stats: offline cache statistics

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};

use finsight_cache::{CacheStore, EmbeddingCache};
use finsight_provider::{OpenAiProvider, OpenAiProviderConfig, TextProvider};
use finsight_service::{run_server_with_shutdown, AppState};
use finsight_types::Settings;
use finsight_vector::TxnIndex;

/// Environment variable holding the provider credential.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("finsight")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("Wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    let pid_path = pid_file_path();
    fs::read_to_string(&pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // On Unix, sending signal 0 checks if process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    true
}

/// Read the provider API key from the environment.
///
/// Absence is a startup-time fatal condition, never a silent `None`.
fn read_api_key() -> Result<String> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .with_context(|| format!("{} must be set before starting the daemon", API_KEY_VAR))
}

/// Start the gateway daemon.
///
/// 1. Load configuration (defaults, file, env, CLI overrides)
/// 2. Read the provider API key (fatal if absent)
/// 3. Open the embedding cache and load or create the vector index
/// 4. Serve HTTP, saving the index on graceful shutdown
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    port_override: Option<u16>,
    db_path_override: Option<&str>,
    index_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    // CLI overrides take highest precedence
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(index_path) = index_path_override {
        settings.index_path = index_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    // Credential check before anything is opened
    let api_key = read_api_key()?;

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Finsight daemon starting...");
    info!("Configuration:");
    info!("  Cache path: {}", settings.db_path);
    info!("  Index path: {}", settings.index_path);
    info!("  Dimension: {}", settings.dimension);
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Log level: {}", settings.log_level);

    if !foreground {
        warn!("Background mode not yet implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    // Construct every handle explicitly; lifecycle is tied to this function,
    // not import order.
    let provider: Arc<dyn TextProvider> = Arc::new(
        OpenAiProvider::new(OpenAiProviderConfig::from_settings(
            &settings.provider,
            api_key,
            settings.dimension,
        ))
        .context("Failed to build provider client")?,
    );

    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let store = CacheStore::open_or_create(&db_path, settings.dimension)
        .context("Failed to open embedding cache")?;
    let cache = Arc::new(EmbeddingCache::new(store, provider.clone()));

    let index_path = settings.expanded_index_path();
    let index = TxnIndex::load_or_create(&index_path, settings.dimension)
        .context("Failed to load vector index")?;
    info!(vectors = index.len(), "Vector index ready");
    let index = Arc::new(RwLock::new(index));

    let state = AppState::new(cache, index.clone(), provider);

    write_pid_file()?;

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    };

    let result = run_server_with_shutdown(addr, state, shutdown_signal).await;

    // Persist the index before exit; the cache is already durable per write.
    if let Err(e) = index.read().await.save() {
        warn!(error = %e, "Failed to save vector index on shutdown");
    }

    remove_pid_file();

    result.map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Daemon not running (stale PID file removed)");
    }

    info!("Stopping daemon (PID {})", pid);

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not yet implemented on this platform");
    }

    Ok(())
}

/// Show daemon status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Finsight daemon is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
            Ok(())
        }
        Some(pid) => {
            println!(
                "Finsight daemon is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
            Ok(())
        }
        None => {
            println!("Finsight daemon is NOT running (no PID file)");
            Ok(())
        }
    }
}

/// Print embedding cache and vector index statistics without starting the
/// daemon.
pub fn admin_stats(config_path: Option<&str>, db_path_override: Option<&str>) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }

    let db_path = settings.expanded_db_path();
    if !db_path.exists() {
        println!("No embedding cache at {:?}", db_path);
        return Ok(());
    }

    let store = CacheStore::open_or_create(&db_path, settings.dimension)
        .context("Failed to open embedding cache")?;

    println!("Embedding cache: {:?}", db_path);
    println!("  Dimension: {}", store.dimension());
    println!("  Cached entries: {}", store.len()?);

    let index_path = settings.expanded_index_path();
    if index_path.exists() {
        let index = TxnIndex::load_or_create(&index_path, settings.dimension)
            .context("Failed to load vector index")?;
        let stats = index.stats();
        println!("Vector index: {:?}", index_path);
        println!("  Dimension: {}", stats.dimension);
        println!("  Vectors: {}", stats.vector_count);
        println!("  File size: {} bytes", stats.size_bytes);
    } else {
        println!("No vector index at {:?}", index_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_path() {
        let path = pid_file_path();
        assert!(path.ends_with("daemon.pid"));
        assert!(path
            .parent()
            .unwrap()
            .to_string_lossy()
            .contains("finsight"));
    }

    #[test]
    fn test_status_no_daemon() {
        // Just verify it doesn't panic
        let result = show_status();
        assert!(result.is_ok());
    }
}
