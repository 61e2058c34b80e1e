//! ItemStore trait: the abstract interface for persisted attribute items.
//!
//! Items live under a `(namespace, key)` pair. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use chainsync_core::attr::{self, AttributeRecord, Item};

use crate::error::Result;

/// Result of writing an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
    /// No item existed under the key.
    Inserted,
    /// A different item was replaced.
    Updated,
    /// The stored item was already identical; nothing was written.
    Unchanged,
}

/// Async interface for item persistence.
///
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the runtime.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Write `item` under `(namespace, key)`, replacing whatever was there.
    async fn put_item(&self, namespace: &str, key: &str, item: &Item) -> Result<PutResult>;

    /// Read the item under `(namespace, key)`.
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<Item>>;

    /// Remove the item under `(namespace, key)`. Returns whether one existed.
    async fn delete_item(&self, namespace: &str, key: &str) -> Result<bool>;

    /// Keys present in `namespace`, in ascending order.
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>>;
}

/// Typed access on top of [`ItemStore`].
pub trait ItemStoreExt: ItemStore {
    /// Encode a record with the attribute codec and store it.
    fn put_record<T: AttributeRecord + Sync>(
        &self,
        namespace: &str,
        key: &str,
        record: &T,
    ) -> impl std::future::Future<Output = Result<PutResult>> + Send;

    /// Load and decode a record.
    fn get_record<T: AttributeRecord + Send>(
        &self,
        namespace: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<T>>> + Send;
}

impl<S: ItemStore + ?Sized> ItemStoreExt for S {
    async fn put_record<T: AttributeRecord + Sync>(
        &self,
        namespace: &str,
        key: &str,
        record: &T,
    ) -> Result<PutResult> {
        let item = attr::to_item(record);
        self.put_item(namespace, key, &item).await
    }

    async fn get_record<T: AttributeRecord + Send>(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<T>> {
        match self.get_item(namespace, key).await? {
            Some(item) => Ok(Some(attr::from_item(&item)?)),
            None => Ok(None),
        }
    }
}
