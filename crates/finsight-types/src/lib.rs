//! Shared configuration and error types for the finsight gateway.

pub mod config;
pub mod error;

pub use config::{ProviderSettings, Settings};
pub use error::ConfigError;
