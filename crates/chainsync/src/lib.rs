//! # Chainsync
//!
//! Chain-sync payloads from a node, carried losslessly through three
//! encodings, plus a persisted cursor for resuming a sync.
//!
//! ## Overview
//!
//! - **Payload types**: points, multi-asset values, output references, and
//!   the full response envelope (see [`core`])
//! - **Codecs**: strict JSON for the wire, deterministic CBOR for compact
//!   storage, and attribute items for durable key-value state
//! - **Cursor**: the most recent points reached, ranked for `FindIntersect`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainsync::codec::{self, Format};
//! use chainsync::store::SqliteStore;
//! use chainsync::{Cursor, CursorConfig, Response};
//!
//! async fn example(payload: &[u8]) -> chainsync::Result<()> {
//!     let response: Response = codec::decode(Format::Json, payload)?;
//!
//!     let store = Arc::new(SqliteStore::open("chainsync.db")?);
//!     let cursor = Cursor::open(store, CursorConfig::default()).await?;
//!
//!     if let Some(forward) = response.result.and_then(|r| r.roll_forward) {
//!         if let Some(point) = forward.block.point() {
//!             cursor.record(point).await?;
//!         }
//!     }
//!
//!     let candidates = cursor.intersection_candidates().await;
//!     println!("resume from {:?}", candidates.best());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `chainsync::core` - Payload types and the three codecs
//! - `chainsync::store` - Item storage abstraction and SQLite

pub mod codec;
pub mod cursor;
pub mod error;

// Re-export component crates
pub use chainsync_core as core;
pub use chainsync_store as store;

// Re-export main types for convenience
pub use codec::{Format, Payload};
pub use cursor::{Cursor, CursorConfig};
pub use error::{ChainsyncError, Result};

// Re-export commonly used core types
pub use chainsync_core::{
    Block, BlockPosition, ChainSyncResult, CodecError, ErrorKind, Int, Point, Points, Response,
    RollBackward, RollForward, Tx, TxId, Uint, Value,
};
