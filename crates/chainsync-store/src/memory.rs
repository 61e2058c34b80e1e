//! In-memory implementation of the ItemStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use chainsync_core::attr::Item;

use crate::error::{Result, StoreError};
use crate::traits::{ItemStore, PutResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<(String, String), Item>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items across all namespaces.
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(err.to_string())
}

fn entry(namespace: &str, key: &str) -> (String, String) {
    (namespace.to_owned(), key.to_owned())
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(&self, namespace: &str, key: &str, item: &Item) -> Result<PutResult> {
        let mut items = self.items.write().map_err(poisoned)?;
        let result = match items.insert(entry(namespace, key), item.clone()) {
            None => PutResult::Inserted,
            Some(previous) if &previous == item => PutResult::Unchanged,
            Some(_) => PutResult::Updated,
        };
        tracing::trace!(namespace, key, ?result, "stored item in memory");
        Ok(result)
    }

    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<Item>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(&entry(namespace, key)).cloned())
    }

    async fn delete_item(&self, namespace: &str, key: &str) -> Result<bool> {
        let mut items = self.items.write().map_err(poisoned)?;
        Ok(items.remove(&entry(namespace, key)).is_some())
    }

    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, key)| key.clone())
            .collect())
    }
}
