//! Provider error types.

use thiserror::Error;

/// Errors from the external embedding/chat provider.
///
/// These are retryable by the caller with backoff; the embedding cache never
/// retries them itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP request failed or returned a non-success status
    #[error("API request failed: {0}")]
    Api(String),

    /// The response body did not have the expected shape
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// HTTP 429 from the provider
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The caller-supplied timeout expired before a response arrived
    #[error("Timeout waiting for response")]
    Timeout,

    /// The returned embedding does not match the configured dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Client construction or configuration failure
    #[error("Invalid configuration: {0}")]
    Config(String),
}
