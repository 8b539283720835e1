//! Shared application state.
//!
//! Every handle is constructed once at daemon startup and injected here;
//! nothing is initialized at import time or held in module-level globals.

use std::sync::Arc;

use tokio::sync::RwLock;

use finsight_cache::EmbeddingCache;
use finsight_provider::TextProvider;
use finsight_vector::TxnIndex;

/// Handles shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Embedding cache (provider-backed, persistent)
    pub cache: Arc<EmbeddingCache>,

    /// Transaction vector index; `RwLock` because the handle is not safe
    /// for concurrent mutation
    pub index: Arc<RwLock<TxnIndex>>,

    /// Chat provider for the pass-through endpoints
    pub provider: Arc<dyn TextProvider>,
}

impl AppState {
    /// Assemble state from constructed handles.
    pub fn new(
        cache: Arc<EmbeddingCache>,
        index: Arc<RwLock<TxnIndex>>,
        provider: Arc<dyn TextProvider>,
    ) -> Self {
        Self {
            cache,
            index,
            provider,
        }
    }
}
