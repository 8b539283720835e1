//! Get-or-create over the persistent store and the external provider.

use std::sync::Arc;

use tracing::{debug, warn};

use finsight_provider::{Embedding, ProviderError, TextProvider};

use crate::codec;
use crate::error::CacheError;
use crate::store::CacheStore;

/// Embedding cache: a persistent store in front of the provider.
///
/// The provider call happens outside the store lock, so two concurrent
/// callers can both miss on the same key; the store's uniqueness constraint
/// resolves the race and the loser re-reads the winner's row.
pub struct EmbeddingCache {
    store: CacheStore,
    provider: Arc<dyn TextProvider>,
}

impl EmbeddingCache {
    /// Build a cache over an opened store and a provider handle.
    pub fn new(store: CacheStore, provider: Arc<dyn TextProvider>) -> Self {
        Self { store, provider }
    }

    /// The dimensionality of every vector in this cache.
    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<u64, CacheError> {
        self.store.len()
    }

    /// Return the vector for `key`, calling the provider on a miss.
    ///
    /// A hit makes zero provider calls and decodes bit-identically to the
    /// stored bytes. On a miss the provider result is persisted before
    /// returning; if the persist fails the result is still returned and the
    /// non-durability is logged, since the same text will be re-fetched on
    /// the next lookup.
    pub async fn get_or_create(&self, key: &str) -> Result<Embedding, CacheError> {
        if key.trim().is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(bytes) = self.store.lookup(key)? {
            debug!(key, "Embedding cache hit");
            return self.decode_entry(key, &bytes);
        }

        debug!(key, "Embedding cache miss, calling provider");
        let embedding = self.provider.embed(key).await?;

        if embedding.dimension() != self.store.dimension() {
            return Err(CacheError::Provider(ProviderError::DimensionMismatch {
                expected: self.store.dimension(),
                actual: embedding.dimension(),
            }));
        }

        let bytes = codec::encode(&embedding.values);
        match self.store.insert_ignore(key, &bytes) {
            Ok(true) => Ok(embedding),
            Ok(false) => {
                // Lost the check-then-insert race; the first writer's value
                // wins so every reader observes the same row.
                match self.store.lookup(key)? {
                    Some(stored) => self.decode_entry(key, &stored),
                    None => Ok(embedding),
                }
            }
            Err(e) => {
                // Non-fatal to the in-flight request, but the entry is not
                // durable and this key will hit the provider again.
                warn!(key, error = %e, "Failed to persist embedding, returning uncached result");
                Ok(embedding)
            }
        }
    }

    fn decode_entry(&self, key: &str, bytes: &[u8]) -> Result<Embedding, CacheError> {
        codec::decode(bytes, self.store.dimension())
            .map(Embedding::new)
            .map_err(|reason| CacheError::CorruptEntry {
                key: key.to_string(),
                reason,
            })
    }
}
