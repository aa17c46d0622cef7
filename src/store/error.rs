//! Store error types
//!
//! Defines all errors that can occur while talking to a backend.

use thiserror::Error;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Row with the given id does not exist in the table
    #[error("{table} row not found: {id}")]
    NotFound { table: String, id: String },

    /// The hosted backend answered with a non-success status
    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    /// Transport failure (connection refused, DNS, TLS, ...)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request to the hosted backend timed out
    #[error("Request timeout")]
    Timeout,

    /// Local database failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unknown table name
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Patch tried to modify an immutable column
    #[error("Column '{0}' cannot be modified")]
    ImmutableColumn(String),

    /// IO error (creating the local database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StoreError {
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Map a reqwest failure the same way for every call site
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Request(err)
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
