//! Error types for LedgerBoard
//!
//! Provides a unified error type for board operations and a narrower
//! error type for the store boundary.

use thiserror::Error;

/// Result type alias using BoardError
pub type Result<T> = std::result::Result<T, BoardError>;

/// Result type alias for store adapter calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Unified error type for LedgerBoard operations
#[derive(Debug, Error)]
pub enum BoardError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Decoding Errors
    // -------------------------------------------------------------------------
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Concurrent allocation conflict on {0}")]
    ConcurrentAllocationConflict(String),

    // -------------------------------------------------------------------------
    // I/O, Network and Protocol Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        BoardError::Decode(e.to_string())
    }
}

impl BoardError {
    /// True when the error came from the store rather than from the data
    pub fn is_store_failure(&self) -> bool {
        matches!(self, BoardError::Store(_))
    }
}

/// Errors raised by a store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log corruption detected: {0}")]
    Corruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
