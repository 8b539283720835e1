//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The on-disk index file could not be deserialized
    #[error("Corrupt index file: {0}")]
    Corrupt(String),

    /// The on-disk index was built for a different dimensionality
    #[error("Dimension mismatch: expected {expected}, index has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// usearch operation failure
    #[error("Index error: {0}")]
    Index(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
