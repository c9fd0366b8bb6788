//! The `LogStore` trait: the single seam between logbed and its
//! persistent store.
//!
//! The store model is deliberately narrow, matching what composite-key
//! stores actually guarantee: exact-match on the partition key, plus a
//! sort-key range filter within that partition. Anything richer (date
//! ranges spanning partitions, merging, ordering across partitions) is
//! built on top by the query engine.

use async_trait::async_trait;
use logbed_core::{keys, LogRecord};

use crate::error::Result;

/// Half-open nanosecond range `[start_ns, end_ns)` over sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKeyRange {
    /// Inclusive lower bound, nanoseconds since epoch.
    pub start_ns: i64,
    /// Exclusive upper bound, nanoseconds since epoch.
    pub end_ns: i64,
}

impl SortKeyRange {
    pub fn new(start_ns: i64, end_ns: i64) -> Self {
        Self { start_ns, end_ns }
    }

    /// Inclusive lower bound in the store's string encoding.
    pub fn encoded_start(&self) -> String {
        keys::encode_sort_key(self.start_ns)
    }

    /// Exclusive upper bound in the store's string encoding.
    pub fn encoded_end(&self) -> String {
        keys::encode_sort_key(self.end_ns)
    }

    /// Inclusive upper bound in the store's string encoding.
    ///
    /// Sort keys are integer nanoseconds, so `[lo, hi)` equals
    /// `[lo, hi - 1]`. Backends whose range filter is inclusive on both
    /// ends (DynamoDB's `BETWEEN`) use this bound.
    pub fn encoded_end_inclusive(&self) -> String {
        keys::encode_sort_key(self.end_ns.saturating_sub(1))
    }
}

/// A composite-key store holding log records.
///
/// Implementations must return query results in ascending sort-key order;
/// that ordering is what lets the query engine concatenate per-partition
/// results without a global re-sort.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist one record. At-least-once: a record put twice with the
    /// same `(partition_key, sort_key)` overwrites itself.
    async fn put(&self, record: &LogRecord) -> Result<()>;

    /// Fetch all records in `partition_key` whose sort key falls within
    /// `range`, ascending by sort key.
    async fn query_range(&self, partition_key: &str, range: SortKeyRange) -> Result<Vec<LogRecord>>;
}
