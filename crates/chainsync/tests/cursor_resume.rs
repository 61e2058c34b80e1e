//! Resuming a sync from a cursor persisted on disk.

use std::sync::Arc;

use chainsync::core::json;
use chainsync::store::SqliteStore;
use chainsync::{Cursor, CursorConfig, Point, Response};
use chainsync_testkit::vectors::vector;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn test_cursor_survives_restart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chainsync.db");

    let response: Response = json::from_str(vector("roll_forward_babbage").unwrap().json).unwrap();
    let point = response
        .result
        .and_then(|r| r.roll_forward)
        .and_then(|f| f.block.point())
        .unwrap();

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let cursor = Cursor::open(store, CursorConfig::default()).await.unwrap();
        cursor.record(Point::block(100, "aa", 1)).await.unwrap();
        cursor.record(point.clone()).await.unwrap();
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let cursor = Cursor::open(store, CursorConfig::default()).await.unwrap();
    let candidates = cursor.intersection_candidates().await;

    assert_eq!(candidates.best(), Some(&point));
    assert_eq!(
        candidates.into_vec(),
        vec![point, Point::block(100, "aa", 1), Point::origin()]
    );
}

#[tokio::test]
async fn test_cursors_are_keyed_independently() {
    init_tracing();
    let store = Arc::new(SqliteStore::open_memory().unwrap());

    let a = Cursor::open(store.clone(), CursorConfig { key: "a".into(), ..CursorConfig::default() })
        .await
        .unwrap();
    let b = Cursor::open(store.clone(), CursorConfig { key: "b".into(), ..CursorConfig::default() })
        .await
        .unwrap();

    a.record(Point::block(5, "05", 0)).await.unwrap();
    assert_eq!(a.load().await.len(), 1);
    assert!(b.load().await.is_empty());

    b.reset().await.unwrap();
    let reopened = Cursor::open(store, CursorConfig { key: "a".into(), ..CursorConfig::default() })
        .await
        .unwrap();
    assert_eq!(reopened.load().await.into_vec(), vec![Point::block(5, "05", 0)]);
}
