//! Error types for the query path.

use logbed_store::StoreError;
use thiserror::Error;

/// Errors that can occur while assembling a date-range query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Missing node id, unparseable or out-of-range date. Surfaced before
    /// any store call is made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A bucket lookup failed. Aborts the whole multi-bucket query unless
    /// the caller opted into partial results.
    #[error("Query failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
