//! # finsight-vector
//!
//! Similarity index over transaction embeddings, persisted as a single file
//! in usearch's native serialization format.
//!
//! `load_or_create` spares callers from special-casing the first run: an
//! existing file is deserialized (and its dimensionality verified), an
//! absent one yields an empty index for the configured dimension. Loading
//! has no filesystem side effects; persistence happens only through the
//! explicit `save`.

pub mod error;
pub mod index;

pub use error::IndexError;
pub use index::{IndexStats, SearchHit, TxnIndex};
