//! Configuration loading for the finsight gateway.
//!
//! Layered precedence: built-in defaults, then the default config file at
//! `~/.config/finsight/config.toml`, then an optional CLI-specified file,
//! then `FINSIGHT_*` environment variables (`FINSIGHT_HTTP_PORT`;
//! `FINSIGHT_PROVIDER__CHAT_MODEL` for nested keys). CLI flags are applied
//! by the caller after loading and override everything.
//!
//! The provider API key is deliberately not part of this struct; it is read
//! once from `OPENAI_API_KEY` at process start and treated as fatal when
//! absent.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// External provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API base URL for OpenAI-compatible endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Chat model name used for news analysis and the chatbot
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries on transient provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the embedding cache SQLite file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Path to the transaction vector index file
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Embedding dimensionality, fixed for the life of the cache and index
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Provider configuration
    #[serde(default)]
    pub provider: ProviderSettings,
}

fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "finsight")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn default_db_path() -> String {
    data_dir().join("embeddings.db").to_string_lossy().to_string()
}

fn default_index_path() -> String {
    data_dir()
        .join("transactions.usearch")
        .to_string_lossy()
        .to_string()
}

fn default_dimension() -> usize {
    // text-embedding-3-small / ada-002 width
    1536
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            index_path: default_index_path(),
            dimension: default_dimension(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            log_level: default_log_level(),
            provider: ProviderSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`~/.config/finsight/config.toml`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`FINSIGHT_*`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "finsight")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("index_path", default_index_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("dimension", default_dimension() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.base_url", default_base_url())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.embedding_model", default_embedding_model())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("provider.chat_model", default_chat_model())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Top-level keys keep single underscores (FINSIGHT_DB_PATH,
        // FINSIGHT_HTTP_PORT); nested keys use a double underscore
        // (FINSIGHT_PROVIDER__CHAT_MODEL -> provider.chat_model). A single
        // "_" separator would split HTTP_PORT into the nested key http.port
        // and the override would be dropped on deserialization.
        builder = builder.add_source(
            Environment::with_prefix("FINSIGHT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate setting values after all layers are merged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 {
            return Err(ConfigError::Invalid("dimension must be > 0".to_string()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the HTTP server.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Expand `~` in `db_path` to the home directory.
    pub fn expanded_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }

    /// Expand `~` in `index_path` to the home directory.
    pub fn expanded_index_path(&self) -> PathBuf {
        expand_home(&self.index_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.http_port, 8000);
        assert_eq!(settings.dimension, 1536);
        assert_eq!(settings.provider.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_http_addr() {
        let settings = Settings::default();
        assert_eq!(settings.http_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let mut settings = Settings::default();
        settings.dimension = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.provider.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_env_overrides_flat_and_nested_keys() {
        std::env::set_var("FINSIGHT_HTTP_PORT", "9100");
        std::env::set_var("FINSIGHT_PROVIDER__CHAT_MODEL", "gpt-test");

        let settings = Settings::load(None).unwrap();

        std::env::remove_var("FINSIGHT_HTTP_PORT");
        std::env::remove_var("FINSIGHT_PROVIDER__CHAT_MODEL");

        assert_eq!(settings.http_port, 9100);
        assert_eq!(settings.provider.chat_model, "gpt-test");
        // Untouched keys keep their defaults
        assert_eq!(settings.dimension, 1536);
    }

    #[test]
    fn test_expand_home() {
        let mut settings = Settings::default();
        settings.db_path = "/tmp/finsight/embeddings.db".to_string();
        assert_eq!(
            settings.expanded_db_path(),
            PathBuf::from("/tmp/finsight/embeddings.db")
        );
    }

    #[test]
    fn test_provider_settings_serialization() {
        let settings = ProviderSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: ProviderSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.max_retries, 3);
        assert_eq!(decoded.timeout_secs, 60);
    }
}
