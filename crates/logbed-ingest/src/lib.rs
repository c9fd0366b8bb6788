//! Streaming ingestion for logbed.
//!
//! Turns an unbounded live log stream into discrete, timestamped,
//! persisted records:
//!
//! ```text
//! LogSource → line framing (8-byte header strip) → single-slot handoff
//!           → key derivation (clock) → LogStore.put, one record per line
//! ```
//!
//! A slow store write stalls the whole chain back to the source; nothing
//! is dropped and nothing is buffered beyond the one in-flight line. Any
//! failure (malformed line, source error, store write error) halts the
//! pipeline; resilience is the supervisor's job, not this crate's.

pub mod error;
pub mod framing;
pub mod pipeline;
pub mod source;

pub use error::{IngestError, Result};
pub use framing::{LogLineDecoder, HEADER_LEN};
pub use pipeline::IngestPipeline;
pub use source::{DockerLogSource, LogSource, LogStream, LogStreamOptions};
