//! Persisted sync cursor.
//!
//! The cursor remembers the most recent points a client has rolled forward
//! to, so that after a restart it can offer them to the node as
//! intersection candidates. Points are kept ranked best-first and stored as
//! a single attribute item.

use std::sync::Arc;

use tokio::sync::Mutex;

use chainsync_core::attr::{AttributeRecord, FromAttribute, Item, ToAttribute};
use chainsync_core::{Point, Points};
use chainsync_store::{ItemStore, ItemStoreExt, StoreError};

use crate::error::{ChainsyncError, Result};

/// Configuration for a [`Cursor`].
#[derive(Debug, Clone)]
pub struct CursorConfig {
    /// Store namespace holding cursor items.
    pub namespace: String,
    /// Key of this cursor's item within the namespace.
    pub key: String,
    /// How many points to retain.
    pub max_points: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            namespace: "cursors".to_string(),
            key: "default".to_string(),
            max_points: 16,
        }
    }
}

/// The persisted form of a cursor.
#[derive(Debug, Clone, Default, PartialEq)]
struct Checkpoint {
    points: Vec<Point>,
}

impl AttributeRecord for Checkpoint {
    fn to_fields(&self) -> Item {
        let mut fields = Item::new();
        fields.insert("points".to_string(), self.points.to_attribute());
        fields
    }

    fn from_fields(fields: &Item) -> chainsync_core::error::Result<Self> {
        let points = match fields.get("points") {
            Some(value) => Vec::<Point>::from_attribute(value).map_err(|e| e.at("points"))?,
            None => Vec::new(),
        };
        Ok(Self { points })
    }
}

/// A sync cursor backed by an [`ItemStore`].
pub struct Cursor<S: ItemStore> {
    store: Arc<S>,
    config: CursorConfig,
    points: Mutex<Points>,
}

impl<S: ItemStore> Cursor<S> {
    /// Open the cursor, loading any checkpoint already in the store.
    ///
    /// A checkpoint that no longer decodes is discarded with a warning and
    /// the cursor starts empty.
    pub async fn open(store: Arc<S>, config: CursorConfig) -> Result<Self> {
        if config.max_points == 0 {
            return Err(ChainsyncError::InvalidConfig(
                "max_points must be at least 1".to_string(),
            ));
        }

        let checkpoint = match store
            .get_record::<Checkpoint>(&config.namespace, &config.key)
            .await
        {
            Ok(checkpoint) => checkpoint.unwrap_or_default(),
            Err(StoreError::Codec(err)) => {
                tracing::warn!(
                    namespace = %config.namespace,
                    key = %config.key,
                    error = %err,
                    "discarding undecodable cursor checkpoint"
                );
                Checkpoint::default()
            }
            Err(err) => return Err(err.into()),
        };

        let mut points = Points::from(checkpoint.points);
        points.sort();
        points.truncate(config.max_points);
        tracing::debug!(key = %config.key, points = points.len(), "opened cursor");

        Ok(Self {
            store,
            config,
            points: Mutex::new(points),
        })
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Remember a point the client has reached.
    pub async fn record(&self, point: Point) -> Result<()> {
        self.record_all(std::iter::once(point)).await
    }

    /// Remember several points at once, persisting a single checkpoint.
    pub async fn record_all(&self, points: impl IntoIterator<Item = Point>) -> Result<()> {
        let mut current = self.points.lock().await;

        let mut merged = current.clone().into_vec();
        for point in points {
            if !merged.contains(&point) {
                merged.push(point);
            }
        }

        let mut merged = Points::from(merged);
        merged.sort();
        merged.truncate(self.config.max_points);

        self.persist(&merged).await?;
        *current = merged;
        Ok(())
    }

    /// The retained points, ranked best-first.
    pub async fn load(&self) -> Points {
        self.points.lock().await.clone()
    }

    /// Points to offer the node when looking for an intersection.
    ///
    /// The retained points ranked best-first, always ending with the origin
    /// so that an intersection is found even if every block was rolled back.
    pub async fn intersection_candidates(&self) -> Points {
        let mut candidates = self.load().await;
        if !candidates.iter().any(|p| p.as_origin().is_some()) {
            candidates.push(Point::origin());
        }
        candidates
    }

    /// Forget every point and remove the persisted checkpoint.
    pub async fn reset(&self) -> Result<()> {
        let mut current = self.points.lock().await;
        let removed = self
            .store
            .delete_item(&self.config.namespace, &self.config.key)
            .await?;
        tracing::debug!(key = %self.config.key, removed, "reset cursor");
        *current = Points::new();
        Ok(())
    }

    async fn persist(&self, points: &Points) -> Result<()> {
        let checkpoint = Checkpoint {
            points: points.as_slice().to_vec(),
        };
        let result = self
            .store
            .put_record(&self.config.namespace, &self.config.key, &checkpoint)
            .await?;
        tracing::debug!(
            key = %self.config.key,
            points = points.len(),
            ?result,
            "persisted cursor checkpoint"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::AttributeValue;
    use chainsync_store::{MemoryStore, SqliteStore};

    fn block(slot: u64) -> Point {
        Point::block(slot, format!("{slot:064x}"), slot / 20)
    }

    fn small_config() -> CursorConfig {
        CursorConfig {
            max_points: 3,
            ..CursorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_record_keeps_best_points() {
        let store = Arc::new(MemoryStore::new());
        let cursor = Cursor::open(store, small_config()).await.unwrap();

        for slot in [10, 50, 20, 40, 30] {
            cursor.record(block(slot)).await.unwrap();
        }

        let points = cursor.load().await.into_vec();
        assert_eq!(points, vec![block(50), block(40), block(30)]);
    }

    #[tokio::test]
    async fn test_duplicates_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let cursor = Cursor::open(store, small_config()).await.unwrap();

        cursor
            .record_all(vec![block(5), block(5), block(6)])
            .await
            .unwrap();
        cursor.record(block(6)).await.unwrap();

        assert_eq!(cursor.load().await.into_vec(), vec![block(6), block(5)]);
    }

    #[tokio::test]
    async fn test_candidates_end_with_origin() {
        let store = Arc::new(MemoryStore::new());
        let cursor = Cursor::open(store, CursorConfig::default()).await.unwrap();

        let candidates = cursor.intersection_candidates().await.into_vec();
        assert_eq!(candidates, vec![Point::origin()]);

        cursor.record(block(100)).await.unwrap();
        let candidates = cursor.intersection_candidates().await.into_vec();
        assert_eq!(candidates, vec![block(100), Point::origin()]);

        cursor.record(Point::origin()).await.unwrap();
        let candidates = cursor.intersection_candidates().await.into_vec();
        assert_eq!(candidates, vec![block(100), Point::origin()]);
    }

    #[tokio::test]
    async fn test_reopen_restores_points() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        {
            let cursor = Cursor::open(store.clone(), small_config()).await.unwrap();
            cursor.record_all([block(1), block(2)]).await.unwrap();
        }

        let cursor = Cursor::open(store.clone(), small_config()).await.unwrap();
        assert_eq!(cursor.load().await.into_vec(), vec![block(2), block(1)]);

        let item = store
            .get_item("cursors", "default")
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(item.get("points"), Some(AttributeValue::L(l)) if l.len() == 2));
    }

    #[tokio::test]
    async fn test_reopen_with_smaller_limit_truncates() {
        let store = Arc::new(MemoryStore::new());
        let cursor = Cursor::open(store.clone(), CursorConfig::default())
            .await
            .unwrap();
        cursor
            .record_all((1..=10).map(block))
            .await
            .unwrap();

        let cursor = Cursor::open(store, small_config()).await.unwrap();
        assert_eq!(
            cursor.load().await.into_vec(),
            vec![block(10), block(9), block(8)]
        );
    }

    #[tokio::test]
    async fn test_reset_clears_store() {
        let store = Arc::new(MemoryStore::new());
        let cursor = Cursor::open(store.clone(), small_config()).await.unwrap();
        cursor.record(block(7)).await.unwrap();

        cursor.reset().await.unwrap();
        assert!(cursor.load().await.is_empty());
        assert!(store.get_item("cursors", "default").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_checkpoint_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let mut item = Item::new();
        item.insert("points".into(), AttributeValue::S("not a list".into()));
        store.put_item("cursors", "default", &item).await.unwrap();

        let cursor = Cursor::open(store, small_config()).await.unwrap();
        assert!(cursor.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_capacity_rejected() {
        let store = Arc::new(MemoryStore::new());
        let config = CursorConfig {
            max_points: 0,
            ..CursorConfig::default()
        };
        assert!(matches!(
            Cursor::open(store, config).await,
            Err(ChainsyncError::InvalidConfig(_))
        ));
    }
}
