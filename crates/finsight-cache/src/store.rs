//! SQLite-backed storage for cached embeddings.
//!
//! Single file, one row per transaction text. The key carries a uniqueness
//! constraint so a lost check-then-insert race degrades to a benign no-op:
//! the first writer's value wins and later readers see one consistent row.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::CacheError;

/// Persistent store for `(transaction text, vector bytes)` pairs.
///
/// Writes are serialized through a mutex-guarded connection; the store is
/// safe to share across threads within one process. Multi-process schema
/// creation is out of scope.
pub struct CacheStore {
    conn: Mutex<Connection>,
    dimension: usize,
}

impl CacheStore {
    /// Open the backing store, creating the schema if absent.
    ///
    /// Idempotent: re-opening an initialized path never alters existing
    /// rows. Fails with [`CacheError::DimensionMismatch`] when the store was
    /// created with a different dimensionality.
    pub fn open_or_create(path: impl AsRef<Path>, dimension: usize) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embeddings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT UNIQUE NOT NULL,
                vector BLOB NOT NULL
            );
            CREATE TABLE IF NOT EXISTS meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                dim INTEGER NOT NULL
            );",
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO meta (id, dim) VALUES (1, ?1)",
            params![dimension as i64],
        )?;

        let stored: i64 = conn.query_row("SELECT dim FROM meta WHERE id = 1", [], |row| {
            row.get(0)
        })?;

        if stored as usize != dimension {
            return Err(CacheError::DimensionMismatch {
                stored: stored as usize,
                configured: dimension,
            });
        }

        info!(path = ?path, dim = dimension, "Opened embedding cache store");

        Ok(Self {
            conn: Mutex::new(conn),
            dimension,
        })
    }

    /// In-memory store for tests.
    pub fn in_memory(dimension: usize) -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embeddings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT UNIQUE NOT NULL,
                vector BLOB NOT NULL
            );
            CREATE TABLE IF NOT EXISTS meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                dim INTEGER NOT NULL
            );",
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (id, dim) VALUES (1, ?1)",
            params![dimension as i64],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            dimension,
        })
    }

    /// The dimensionality this store was created with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fetch the stored bytes for a key, if present.
    pub fn lookup(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let bytes = conn
            .query_row(
                "SELECT vector FROM embeddings WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(bytes)
    }

    /// Insert a `(key, bytes)` pair, ignoring a pre-existing row for the key.
    ///
    /// Returns `true` when this call inserted the row, `false` when another
    /// writer got there first and its value was kept.
    pub fn insert_ignore(&self, key: &str, bytes: &[u8]) -> Result<bool, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn.execute(
            "INSERT OR IGNORE INTO embeddings (key, vector) VALUES (?1, ?2)",
            params![key, bytes],
        )?;
        debug!(key, inserted = changed == 1, "Cache insert");
        Ok(changed == 1)
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
