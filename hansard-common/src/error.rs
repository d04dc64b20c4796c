//! Common error types for the Hansard explorer

use std::time::Duration;
use thiserror::Error;

/// Common result type for Hansard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Hansard crates
#[derive(Error, Debug)]
pub enum Error {
    /// Record store operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON column or imported document could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request that owned the query was aborted or the store is shutting down
    #[error("Query cancelled")]
    Cancelled,

    /// The query did not finish within its deadline
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
