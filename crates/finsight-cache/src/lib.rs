//! # finsight-cache
//!
//! Persistent embedding cache keyed by transaction text.
//!
//! The cache dedupes calls to the external embedding provider: a hit decodes
//! the stored bytes, a miss calls the provider and persists the result before
//! returning it. Entries are write-once per key; re-reading a key is a pure
//! read and makes zero provider calls.
//!
//! Byte layout: little-endian IEEE-754 f32, `dimension * 4` bytes per entry.
//! The dimensionality is fixed when the backing store is created and checked
//! on every subsequent open.

pub mod cache;
pub mod codec;
pub mod error;
pub mod store;

pub use cache::EmbeddingCache;
pub use error::CacheError;
pub use store::CacheStore;
