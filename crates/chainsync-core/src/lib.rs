//! # Chainsync Core
//!
//! Pure payload types for a node's chain-sync protocol, and the three codecs
//! that carry them: strict JSON, compact CBOR, and durable attribute items.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Point`] - Either the origin sentinel or a `(slot, hash, blockNo)` position
//! - [`Points`] - Candidate points ranked for resynchronization
//! - [`Value`] - Coins plus native-asset quantities, with implicit-zero equality
//! - [`TxId`] - `"<txHash>#<index>"` output reference
//! - [`Int`] / [`Uint`] - Arbitrary-precision quantities
//! - [`Response`] - The chain-sync envelope and everything nested in it
//!
//! ## Codecs
//!
//! - [`json`] - schema-strict, unknown fields rejected everywhere
//! - [`cbor`] - deterministic encoding, see [`cbor::encode_canonical`]
//! - [`attr`] - DynamoDB-style typed attributes for persisted state

pub mod attr;
pub mod cbor;
pub mod envelope;
pub mod error;
pub mod json;
pub mod num;
pub mod point;
pub mod txid;
pub mod value;

pub use attr::{AttributeRecord, AttributeValue, FromAttribute, Item, ToAttribute};
pub use cbor::{CborDecode, CborEncode};
pub use envelope::{
    Block, BlockHeader, ChainSyncResult, Era, EraBlock, IntersectionFound, IntersectionNotFound,
    RawBytes, Response, RollBackward, RollForward, Tx, TxBody, TxIn, TxOut, Witness,
};
pub use error::{CodecError, ErrorKind};
pub use num::{Int, Uint};
pub use point::{BlockPosition, Point, PointKind, Points, ORIGIN};
pub use txid::TxId;
pub use value::{AssetId, Value};
