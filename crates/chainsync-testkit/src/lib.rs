//! # Chainsync Testkit
//!
//! Testing utilities for chainsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Conformance vectors**: Node responses every decoder must accept without
//!   unknown-field errors and carry losslessly through every format
//! - **Fixtures**: A table of values with their exact encoding in each format
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Conformance Vectors
//!
//! ```rust
//! use chainsync_core::{json, Response};
//! use chainsync_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let response: Response = json::from_str(vector.json).unwrap();
//!     println!("{}: {}", vector.name, response.methodname);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use chainsync_core::{cbor, Point};
//! use chainsync_testkit::generators::point;
//!
//! proptest! {
//!     #[test]
//!     fn point_cbor_round_trip(p in point()) {
//!         let bytes = cbor::to_vec(&p);
//!         prop_assert_eq!(cbor::from_slice::<Point>(&bytes).unwrap(), p);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{point_fixtures, value_fixtures, Fixture};
pub use generators::{block_position, int, point, points, tx_id, uint, value};
pub use vectors::{all_vectors, vector, Vector};
