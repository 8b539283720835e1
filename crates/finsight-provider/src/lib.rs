//! # finsight-provider
//!
//! Client for the external text provider: embeddings plus chat completions
//! against OpenAI-compatible endpoints.
//!
//! The rest of the system sees only the [`TextProvider`] trait; the HTTP
//! client lives behind it so tests run on [`MockProvider`] without network.

pub mod error;
pub mod mock;
pub mod model;
pub mod openai;

use async_trait::async_trait;

pub use error::ProviderError;
pub use mock::MockProvider;
pub use model::Embedding;
pub use openai::{OpenAiProvider, OpenAiProviderConfig};

/// Pluggable text provider trait.
///
/// Implementations must be thread-safe for concurrent use.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate an embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError>;

    /// Run a chat completion: one system prompt, one user message.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}
