//! Error type for configuration loading.

use thiserror::Error;

/// Errors raised while assembling [`crate::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config source could not be read or merged
    #[error("Configuration error: {0}")]
    Load(String),

    /// A setting is present but outside its valid range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
