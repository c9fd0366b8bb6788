//! Query path for logbed.
//!
//! The store only answers exact-match partition lookups with an
//! in-partition sort-key range, so "all logs for node N between date A and
//! date B" has to be assembled: derive the nanosecond bounds from the
//! calendar dates, enumerate every 30-day bucket the range touches, issue
//! one range query per bucket, and concatenate the results in bucket
//! order. Buckets are disjoint contiguous time windows, so no global
//! re-sort is needed.

pub mod dates;
pub mod engine;
pub mod error;

pub use engine::{QueryEngine, QueryOptions};
pub use error::{QueryError, Result};
