//! Error types for the umbrella crate.

use chainsync_core::CodecError;
use chainsync_store::StoreError;
use thiserror::Error;

/// Errors that can occur in cursor and codec operations.
#[derive(Debug, Error)]
pub enum ChainsyncError {
    /// A payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for umbrella operations.
pub type Result<T> = std::result::Result<T, ChainsyncError>;
