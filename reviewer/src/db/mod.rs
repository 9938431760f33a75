//! Persistent key-value backing store for review histories
//!
//! Values are opaque bytes addressed by `(namespace, key)`. The history layer
//! uses one namespace per identity. Two backends are provided:
//! - [`SqliteStore`]: durable, stored in ~/.code-reviewer/history.db by default
//! - [`MemoryStore`]: process-local, for ephemeral deployments and tests

mod memory;
pub mod schema;

pub use memory::MemoryStore;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Trait for key-value backends
///
/// A `put` must be all-or-nothing: after a failed `put`, `get` returns the
/// previous value.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key` in `namespace`
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the value stored under `key` in `namespace`
    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
}

/// SQLite-backed store with serialized access to one connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the default location (~/.code-reviewer/history.db)
    pub fn open() -> Result<Self, StorageError> {
        let path = Self::default_path()?;
        Self::open_at(&path)
    }

    /// Open or create the database at a specific path
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // WAL keeps readers off the writer's lock; the pragma returns a row
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        init(&conn)?;

        tracing::info!("History database opened at {:?}", path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let home = dirs::home_dir().ok_or_else(|| {
            StorageError::Unavailable("could not determine home directory".to_string())
        })?;
        Ok(home.join(".code-reviewer").join("history.db"))
    }
}

/// Create tables and refuse databases written by a newer schema
fn init(conn: &Connection) -> Result<(), StorageError> {
    schema::create_tables(conn)?;
    let version = schema::get_version(conn)?;
    if version > schema::SCHEMA_VERSION {
        return Err(StorageError::Unavailable(format!(
            "history database has schema version {}, newest supported is {}",
            version,
            schema::SCHEMA_VERSION
        )));
    }
    tracing::debug!("History schema version {}", version);
    Ok(())
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let conn = self.conn.lock().await;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        // A single upsert statement commits atomically
        conn.execute(
            r#"
            INSERT INTO kv (namespace, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![namespace, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("alice", "history").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("alice", "history", b"one".to_vec()).await.unwrap();
        store.put("alice", "history", b"two".to_vec()).await.unwrap();

        let value = store.get("alice", "history").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"two"[..]));
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("alice", "history", b"a".to_vec()).await.unwrap();

        assert!(store.get("bob", "history").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        {
            let store = SqliteStore::open_at(&path).unwrap();
            store.put("alice", "history", b"[]".to_vec()).await.unwrap();
        }

        let store = SqliteStore::open_at(&path).unwrap();
        let value = store.get("alice", "history").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        drop(SqliteStore::open_at(&path).unwrap());

        let conn = Connection::open(&path).unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [schema::SCHEMA_VERSION + 1])
            .unwrap();
        drop(conn);

        let err = SqliteStore::open_at(&path).err().unwrap();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
