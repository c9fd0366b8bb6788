//! Record Data Structure
//!
//! This module defines the core `LogRecord` type - one persisted line of
//! container output.
//!
//! ## What is a LogRecord?
//! A record is a single log line captured from a workload, keyed so that
//! a composite-key store can answer "all lines for node N in time window W":
//! - **partition_key**: exact-match shard key, `{node_id}.{month_bucket}.dockerlogs`
//! - **sort_key**: zero-padded nanosecond timestamp, the range-query axis
//! - **workload_id**: the container the line came from
//! - **payload**: the line text with its 8-byte stream header removed
//!
//! ## Design Decisions
//! - Records are immutable: created once at ingestion, never updated
//! - The sort key is stored as a string because the store compares sort
//!   keys lexicographically; see [`crate::keys::encode_sort_key`] for the
//!   fixed-width encoding that makes that comparison numeric
//! - `Serialize`/`Deserialize` so store backends can map records to their
//!   native attribute formats

use serde::{Deserialize, Serialize};

use crate::keys;

/// A single persisted log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Exact-match partition key: `{node_id}.{month_bucket}.dockerlogs`.
    pub partition_key: String,

    /// Zero-padded nanoseconds since epoch; unique within a partition for
    /// a single ingesting process.
    pub sort_key: String,

    /// Identifier of the source container at ingestion time.
    pub workload_id: String,

    /// One line of log text, stream header stripped.
    pub payload: String,
}

impl LogRecord {
    /// Build a record for `node_id` from a line captured at `nanos`.
    ///
    /// Both keys are derived from the same instant so the partition a
    /// record lands in always agrees with its sort key.
    pub fn at_instant(node_id: &str, workload_id: &str, nanos: i64, payload: String) -> Self {
        let bucket = keys::month_bucket(nanos / keys::NANOS_PER_SEC);
        Self {
            partition_key: keys::partition_key(node_id, bucket),
            sort_key: keys::encode_sort_key(nanos),
            workload_id: workload_id.to_string(),
            payload,
        }
    }

    /// Estimate the size of this record in bytes.
    pub fn estimated_size(&self) -> usize {
        self.partition_key.len() + self.sort_key.len() + self.workload_id.len() + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_instant_derives_both_keys_from_one_instant() {
        // 2021-06-01T00:00:00Z
        let nanos = 1_622_505_600_000_000_000i64;
        let rec = LogRecord::at_instant("3", "abc123", nanos, "hello world".to_string());

        let bucket = keys::month_bucket(nanos / keys::NANOS_PER_SEC);
        assert_eq!(rec.partition_key, format!("3.{}.dockerlogs", bucket));
        assert_eq!(rec.sort_key, keys::encode_sort_key(nanos));
        assert_eq!(rec.workload_id, "abc123");
        assert_eq!(rec.payload, "hello world");
    }

    #[test]
    fn test_estimated_size() {
        let rec = LogRecord {
            partition_key: "1.633.dockerlogs".to_string(),
            sort_key: "0".repeat(19),
            workload_id: "c1".to_string(),
            payload: "first".to_string(),
        };
        assert_eq!(rec.estimated_size(), 16 + 19 + 2 + 5);
    }

    #[test]
    fn test_serde_round_trip() {
        let rec = LogRecord::at_instant("1", "c1", 1_622_505_600_000_000_000, "x".to_string());
        let json = serde_json::to_string(&rec).unwrap();
        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
