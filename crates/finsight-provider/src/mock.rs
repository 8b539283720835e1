//! Mock provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ProviderError;
use crate::model::Embedding;
use crate::TextProvider;

/// Mock provider that generates deterministic embeddings and completions.
///
/// Useful for testing without making API calls. Every call is counted so
/// tests can assert that the cache dedupes provider traffic.
pub struct MockProvider {
    dimension: usize,
    embed_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    fail_embeds: bool,
}

impl MockProvider {
    /// Create a mock producing vectors of the given dimensionality.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embed_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            fail_embeds: false,
        }
    }

    /// Create a mock whose embed calls always fail.
    pub fn failing(dimension: usize) -> Self {
        Self {
            fail_embeds: true,
            ..Self::new(dimension)
        }
    }

    /// Number of embed calls made so far.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Number of completion calls made so far.
    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }
}

/// Deterministic vector derived from a text hash.
///
/// Equal texts always map to bit-identical vectors; distinct texts are very
/// unlikely to collide.
fn synthetic_vector(text: &str, dimension: usize) -> Vec<f32> {
    // FNV-1a
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;
    for b in text.bytes() {
        state ^= b as u64;
        state = state.wrapping_mul(0x100_0000_01b3);
    }

    (0..dimension)
        .map(|i| {
            let mut x = state ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
            x ^= x >> 33;
            x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
            x ^= x >> 33;
            (x as f32) / (u64::MAX as f32)
        })
        .collect()
}

#[async_trait]
impl TextProvider for MockProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_embeds {
            return Err(ProviderError::Api("mock embed failure".to_string()));
        }
        Ok(Embedding::new(synthetic_vector(text, self.dimension)))
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}] {}", system.len(), user))
    }
}
