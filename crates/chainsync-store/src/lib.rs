//! # Chainsync Store
//!
//! Durable storage for chain-sync state. Records are encoded with the
//! attribute codec from `chainsync-core` and kept as items under a
//! `(namespace, key)` pair.
//!
//! ## Key Types
//!
//! - [`ItemStore`] - The async trait for all storage operations
//! - [`ItemStoreExt`] - Typed record helpers on top of it
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`PutResult`] - Outcome of a write
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chainsync_core::{attr, TxIn};
//! use chainsync_store::{ItemStore, PutResult, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("chainsync.db").unwrap();
//!
//!     let input = TxIn { tx_id: "ab".into(), index: 0 };
//!     let result = store
//!         .put_item("inputs", "ab#0", &attr::to_item(&input))
//!         .await
//!         .unwrap();
//!     assert_eq!(result, PutResult::Inserted);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent writes**: Writing an identical item returns `Unchanged`
//! - **Stable encoding**: Items are persisted in the DynamoDB JSON shape

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ItemStore, ItemStoreExt, PutResult};
