//! Embedding cache error types.

use thiserror::Error;

use finsight_provider::ProviderError;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Empty or whitespace-only key, rejected before any provider call
    #[error("Transaction text must not be empty")]
    EmptyKey,

    /// The external embedding call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Local persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored blob does not decode to a vector of the expected length
    #[error("Corrupt cache entry for key {key:?}: {reason}")]
    CorruptEntry { key: String, reason: String },

    /// The store on disk was created with a different dimensionality
    #[error("Dimension mismatch: store created with {stored}, configured {configured}")]
    DimensionMismatch { stored: usize, configured: usize },
}
