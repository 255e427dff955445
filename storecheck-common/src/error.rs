//! Common error types for StoreCheck

use thiserror::Error;

/// Common result type for StoreCheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across StoreCheck modules
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pre-submission validation failure, names the offending field/record
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Concurrent modification detected on a versioned write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors the caller should report as a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
