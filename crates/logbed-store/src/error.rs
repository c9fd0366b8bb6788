//! Error types for store operations.
//!
//! Every failure mode of the store seam is terminal for its caller: a
//! write error halts ingestion, a query error aborts the surrounding
//! multi-bucket query. There is no retry machinery here; supervision
//! belongs to whoever runs the process.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A `put` failed (throughput exceeded, internal error, missing table).
    #[error("Write error: {0}")]
    Write(String),

    /// A range query failed.
    #[error("Query error: {0}")]
    Query(String),

    /// A store operation exceeded its deadline.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A stored item could not be mapped to a record.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
