//! usearch-backed transaction index.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use finsight_provider::Embedding;

use crate::error::IndexError;

/// Pre-allocated capacity for fresh and freshly loaded indexes.
const DEFAULT_CAPACITY: usize = 100_000;

/// A nearest neighbor from a search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Vector ID assigned at insert time
    pub id: u64,
    /// Squared L2 distance (lower = more similar)
    pub distance: f32,
}

/// Index statistics for the status surface.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub vector_count: usize,
    /// Embedding dimension
    pub dimension: usize,
    /// Index file size in bytes (0 before the first save)
    pub size_bytes: u64,
}

/// Similarity index over transaction embeddings.
///
/// Concurrent read-only search is safe; mutation needs external locking
/// (the service wraps the handle in an `RwLock`).
pub struct TxnIndex {
    index: Index,
    dimension: usize,
    path: PathBuf,
}

impl TxnIndex {
    fn options(dimension: usize) -> IndexOptions {
        IndexOptions {
            dimensions: dimension,
            // Squared L2, matching the original flat-L2 default
            metric: MetricKind::L2sq,
            quantization: ScalarKind::F32,
            connectivity: 16,
            expansion_add: 200,
            expansion_search: 100,
            multi: false,
        }
    }

    /// Load the index from `path`, or create an empty one if no file exists.
    ///
    /// Fails with [`IndexError::Corrupt`] when the file is unreadable and
    /// [`IndexError::DimensionMismatch`] when its dimensionality differs
    /// from `dimension`. Never touches the filesystem beyond reading.
    pub fn load_or_create(path: impl AsRef<Path>, dimension: usize) -> Result<Self, IndexError> {
        let path = path.as_ref().to_path_buf();
        let options = Self::options(dimension);

        let index = Index::new(&options).map_err(|e| IndexError::Index(e.to_string()))?;

        if path.exists() {
            info!(path = ?path, "Loading vector index");
            let path_str = path
                .to_str()
                .ok_or_else(|| IndexError::Index("Invalid path encoding".to_string()))?;
            index
                .load(path_str)
                .map_err(|e| IndexError::Corrupt(format!("Failed to load: {}", e)))?;

            let actual = index.dimensions();
            if actual != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual,
                });
            }

            // A loaded file carries no spare capacity for further inserts.
            index
                .reserve(index.size() + DEFAULT_CAPACITY)
                .map_err(|e| IndexError::Index(e.to_string()))?;
        } else {
            info!(path = ?path, dim = dimension, "Creating new vector index");
            index
                .reserve(DEFAULT_CAPACITY)
                .map_err(|e| IndexError::Index(e.to_string()))?;
        }

        Ok(Self {
            index,
            dimension,
            path,
        })
    }

    /// The dimensionality this index was configured with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a vector under the given ID.
    pub fn insert(&mut self, id: u64, embedding: &Embedding) -> Result<(), IndexError> {
        if embedding.dimension() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.dimension(),
            });
        }

        self.index
            .add(id, &embedding.values)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        debug!(id, "Added vector");
        Ok(())
    }

    /// Search for the `k` nearest neighbors, best first.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if query.dimension() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            });
        }

        let matches = self
            .index
            .search(&query.values, k)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        let hits: Vec<SearchHit> = matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .map(|(&id, &distance)| SearchHit { id, distance })
            .collect();

        debug!(k, found = hits.len(), "Search complete");
        Ok(hits)
    }

    /// Serialize the current state to the configured path, overwriting any
    /// existing file.
    pub fn save(&self) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = self
            .path
            .to_str()
            .ok_or_else(|| IndexError::Index("Invalid path encoding".to_string()))?;
        self.index
            .save(path_str)
            .map_err(|e| IndexError::Index(format!("Failed to save: {}", e)))?;

        info!(path = ?self.path, vectors = self.index.size(), "Saved vector index");
        Ok(())
    }

    /// Current statistics for the status surface.
    pub fn stats(&self) -> IndexStats {
        let size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        IndexStats {
            vector_count: self.index.size(),
            dimension: self.dimension,
            size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn random_embedding(dim: usize) -> Embedding {
        use rand::Rng;
        let mut rng = rand::rng();
        let values: Vec<f32> = (0..dim).map(|_| rng.random()).collect();
        Embedding::new(values)
    }

    #[test]
    fn test_create_empty_index() {
        let temp = TempDir::new().unwrap();
        let index = TxnIndex::load_or_create(temp.path().join("txn.usearch"), 64).unwrap();
        assert_eq!(index.dimension(), 64);
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_without_file_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("txn.usearch");
        let _index = TxnIndex::load_or_create(&path, 64).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_insert_and_search() {
        let temp = TempDir::new().unwrap();
        let mut index = TxnIndex::load_or_create(temp.path().join("txn.usearch"), 32).unwrap();

        for i in 0..10 {
            index.insert(i, &random_embedding(32)).unwrap();
        }
        assert_eq!(index.len(), 10);

        let hits = index.search(&random_embedding(32), 5).unwrap();
        assert_eq!(hits.len(), 5);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("txn.usearch");

        {
            let mut index = TxnIndex::load_or_create(&path, 32).unwrap();
            for i in 0..5 {
                index.insert(i, &random_embedding(32)).unwrap();
            }
            index.save().unwrap();
        }

        let reopened = TxnIndex::load_or_create(&path, 32).unwrap();
        assert_eq!(reopened.dimension(), 32);
        assert_eq!(reopened.len(), 5);
    }

    #[test]
    fn test_stats_track_inserts_and_file_size() {
        let temp = TempDir::new().unwrap();
        let mut index = TxnIndex::load_or_create(temp.path().join("txn.usearch"), 32).unwrap();

        let stats = index.stats();
        assert_eq!(stats.vector_count, 0);
        assert_eq!(stats.dimension, 32);
        assert_eq!(stats.size_bytes, 0);

        for i in 0..4 {
            index.insert(i, &random_embedding(32)).unwrap();
        }
        index.save().unwrap();

        let stats = index.stats();
        assert_eq!(stats.vector_count, 4);
        assert!(stats.size_bytes > 0);
    }

    #[test]
    fn test_load_with_wrong_dimension_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("txn.usearch");

        {
            let mut index = TxnIndex::load_or_create(&path, 32).unwrap();
            index.insert(0, &random_embedding(32)).unwrap();
            index.save().unwrap();
        }

        let result = TxnIndex::load_or_create(&path, 64);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { expected: 64, .. })
        ));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("txn.usearch");
        std::fs::write(&path, b"not an index").unwrap();

        let result = TxnIndex::load_or_create(&path, 32);
        assert!(matches!(result, Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        let temp = TempDir::new().unwrap();
        let mut index = TxnIndex::load_or_create(temp.path().join("txn.usearch"), 32).unwrap();

        let result = index.insert(0, &random_embedding(16));
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { .. })
        ));
    }
}
