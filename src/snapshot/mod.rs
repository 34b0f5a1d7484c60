//! SQLite-based snapshot store for loaded schema caches.
//!
//! Loading a catalog means four full scans of the system views. The result is
//! kept here so later searches against the same connection can start from the
//! snapshot. The store lives in `~/.catalog-search/snapshots.db`.
//!
//! # Design
//!
//! - Key/value table with JSON values
//! - No TTL; a snapshot stays until refreshed or cleared
//! - Versioned; a format change clears every snapshot
//!
//! # Key Format
//!
//! ```text
//! {conn_hash}:catalog      -> InMemorySchemaCache
//! {conn_hash}:loaded_at    -> unix seconds
//! ```

mod hash;
pub use hash::fingerprint;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::catalog::InMemorySchemaCache;

/// Bump when the serialized cache layout changes.
const SNAPSHOT_VERSION: i32 = 1;

/// Errors that can occur during snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Key/value store holding one catalog snapshot per connection.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open the store at its default location.
    pub fn open_default() -> SnapshotResult<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open or create a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> SnapshotResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    pub fn default_path() -> SnapshotResult<PathBuf> {
        let home = dirs::home_dir().ok_or(SnapshotError::NoHomeDir)?;
        Ok(home.join(".catalog-search").join("snapshots.db"))
    }

    fn init(&self) -> SnapshotResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS snapshot (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == SNAPSHOT_VERSION => {}
            Some(v) => {
                tracing::info!(
                    stored = v,
                    current = SNAPSHOT_VERSION,
                    "snapshot format changed, clearing store"
                );
                self.clear_all()?;
                self.set_version()?;
            }
            None => self.set_version()?,
        }
        Ok(())
    }

    fn set_version(&self) -> SnapshotResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![SNAPSHOT_VERSION.to_string()],
        )?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> SnapshotResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM snapshot WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(SnapshotError::from)
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> SnapshotResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Store the cache loaded for `conn_hash`, replacing any previous one.
    pub fn save(&self, conn_hash: &str, cache: &InMemorySchemaCache) -> SnapshotResult<()> {
        let loaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.set(&SnapshotKey::catalog(conn_hash), cache)?;
        self.set(&SnapshotKey::loaded_at(conn_hash), &loaded_at)?;
        tracing::debug!(conn_hash, schemas = cache.len(), "saved catalog snapshot");
        Ok(())
    }

    pub fn load(&self, conn_hash: &str) -> SnapshotResult<Option<InMemorySchemaCache>> {
        self.get(&SnapshotKey::catalog(conn_hash))
    }

    /// Unix time of the last save for `conn_hash`.
    pub fn loaded_at(&self, conn_hash: &str) -> SnapshotResult<Option<u64>> {
        self.get(&SnapshotKey::loaded_at(conn_hash))
    }

    /// Drop every entry for one connection. Returns the number removed.
    pub fn delete(&self, conn_hash: &str) -> SnapshotResult<usize> {
        let pattern = format!("{}:%", conn_hash);
        let rows = self
            .conn
            .execute("DELETE FROM snapshot WHERE key LIKE ?", params![pattern])?;
        Ok(rows)
    }

    pub fn clear_all(&self) -> SnapshotResult<()> {
        self.conn.execute("DELETE FROM snapshot", [])?;
        Ok(())
    }

    pub fn stats(&self) -> SnapshotResult<SnapshotStats> {
        let snapshot_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM snapshot WHERE key LIKE '%:catalog'",
            [],
            |row| row.get(0),
        )?;
        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(value)), 0) FROM snapshot",
            [],
            |row| row.get(0),
        )?;

        Ok(SnapshotStats {
            snapshot_count: snapshot_count as usize,
            total_size_bytes: total_size as usize,
        })
    }
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct SnapshotStats {
    /// Number of stored catalog snapshots.
    pub snapshot_count: usize,
    /// Total size of all values in bytes.
    pub total_size_bytes: usize,
}

struct SnapshotKey;

impl SnapshotKey {
    fn catalog(conn_hash: &str) -> String {
        format!("{}:catalog", conn_hash)
    }

    fn loaded_at(conn_hash: &str) -> String {
        format!("{}:loaded_at", conn_hash)
    }
}
