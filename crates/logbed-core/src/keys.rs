//! Key Derivation
//!
//! The store underneath logbed supports only exact-match partition lookups
//! plus a sort-key range within a partition, so both subsystems (ingestion
//! and query) must agree byte-for-byte on how keys are derived. This module
//! is that agreement.
//!
//! ## Partition key
//! `{node_id}.{month_bucket}.dockerlogs`, where the month bucket is elapsed
//! unix time divided by a fixed 30-day window. Not calendar-month aligned;
//! it only has to be a pure function of time that both sides compute
//! identically.
//!
//! ## Sort key
//! Nanoseconds since epoch, zero-padded to 19 digits. The store compares
//! sort keys as strings, and a plain decimal string breaks ordering at
//! digit-width transitions (`"999..."` > `"1000..."`). 19 digits covers
//! every positive `i64` nanosecond value, so padded lexicographic order
//! equals numeric order.

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Seconds in one 30-day bucket window.
pub const MONTH_BUCKET_SECS: i64 = 30 * 24 * 3600;

/// Digits in an encoded sort key. 19 covers `i64::MAX` nanoseconds.
pub const SORT_KEY_DIGITS: usize = 19;

/// Suffix identifying the log category within a node's keyspace.
const CATEGORY: &str = "dockerlogs";

/// Map an instant (unix seconds) to its 30-day bucket id.
pub fn month_bucket(unix_seconds: i64) -> i64 {
    unix_seconds.div_euclid(MONTH_BUCKET_SECS)
}

/// Compose the exact-match partition key for a node and bucket.
pub fn partition_key(node_id: &str, bucket: i64) -> String {
    format!("{}.{}.{}", node_id, bucket, CATEGORY)
}

/// Encode a nanosecond instant as a fixed-width sort key.
pub fn encode_sort_key(nanos: i64) -> String {
    format!("{:0width$}", nanos, width = SORT_KEY_DIGITS)
}
