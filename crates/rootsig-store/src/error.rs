//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Namespace name rejected.
    #[error("invalid namespace '{0}'")]
    InvalidNamespace(String),
    /// An account already exists for the username.
    #[error("account '{0}' already exists")]
    AccountExists(String),
    /// Backend unavailable or failed in a backend-specific way.
    #[error("{0}")]
    Other(String),
}
