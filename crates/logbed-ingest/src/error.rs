//! Error types for the ingestion pipeline.
//!
//! Every variant is fatal to the pipeline that produced it: there is no
//! per-line recovery, no retry, no dead-letter path. A caller that needs
//! resilience restarts the pipeline from outside.

use logbed_store::StoreError;
use thiserror::Error;

/// Errors that halt an ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A complete line was shorter than the fixed stream header.
    #[error("Framing error: {len}-byte line is shorter than the 8-byte stream header")]
    Framing { len: usize },

    /// The container runtime or log stream could not be opened.
    #[error("Source error: {0}")]
    Source(String),

    /// Persisting a record failed.
    #[error("Store write failed: {0}")]
    StoreWrite(#[from] StoreError),

    /// The underlying byte stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
