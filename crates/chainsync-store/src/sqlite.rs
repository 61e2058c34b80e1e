//! SQLite implementation of the ItemStore trait.
//!
//! This is the primary storage backend for persisted chain-sync state. It
//! uses rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking. Items are kept in their DynamoDB JSON shape, so a
//! row can be inspected or exported without going through this crate.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use chainsync_core::attr::{self, Item};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{ItemStore, PutResult};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&conn)
        })
        .await?
    }
}

fn decode_row(namespace: &str, key: &str, bytes: &[u8]) -> Result<Item> {
    attr::from_json_bytes(bytes).map_err(|err| {
        tracing::warn!(namespace, key, error = %err, "stored item is not decodable");
        StoreError::Codec(err)
    })
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn put_item(&self, namespace: &str, key: &str, item: &Item) -> Result<PutResult> {
        let encoded = attr::to_json_bytes(item)?;
        let namespace = namespace.to_owned();
        let key = key.to_owned();

        self.blocking(move |conn| {
            let existing: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT item FROM items WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                    |row| row.get(0),
                )
                .optional()?;

            let now = now_millis();
            let result = match existing {
                Some(bytes) if bytes == encoded => return Ok(PutResult::Unchanged),
                Some(_) => {
                    conn.execute(
                        "UPDATE items SET item = ?3, updated_at = ?4
                         WHERE namespace = ?1 AND key = ?2",
                        params![namespace, key, encoded, now],
                    )?;
                    PutResult::Updated
                }
                None => {
                    conn.execute(
                        "INSERT INTO items (namespace, key, item, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?4)",
                        params![namespace, key, encoded, now],
                    )?;
                    PutResult::Inserted
                }
            };

            tracing::debug!(%namespace, %key, bytes = encoded.len(), ?result, "stored item");
            Ok(result)
        })
        .await
    }

    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<Item>> {
        let namespace = namespace.to_owned();
        let key = key.to_owned();

        self.blocking(move |conn| {
            let bytes: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT item FROM items WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                    |row| row.get(0),
                )
                .optional()?;

            bytes
                .map(|bytes| decode_row(&namespace, &key, &bytes))
                .transpose()
        })
        .await
    }

    async fn delete_item(&self, namespace: &str, key: &str) -> Result<bool> {
        let namespace = namespace.to_owned();
        let key = key.to_owned();

        self.blocking(move |conn| {
            let removed = conn.execute(
                "DELETE FROM items WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
            )?;
            if removed > 0 {
                tracing::debug!(%namespace, %key, "deleted item");
            }
            Ok(removed > 0)
        })
        .await
    }

    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>> {
        let namespace = namespace.to_owned();

        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare("SELECT key FROM items WHERE namespace = ?1 ORDER BY key ASC")?;
            let keys = stmt
                .query_map(params![namespace], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await
    }
}
