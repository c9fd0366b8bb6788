//! Query Engine
//!
//! Reconstructs a node's chronological log view from exact-match bucket
//! lookups:
//!
//! ```text
//! date range → [start_ns, end_ns) → bucket ids → one range query per
//! bucket → concatenate in bucket order
//! ```
//!
//! ## Failure policy
//! A failed bucket aborts the whole query and discards any buckets already
//! gathered: callers get all-or-nothing results, never silently incomplete
//! ones. `QueryOptions::allow_partial` makes the tolerant mode an explicit
//! opt-in: a failed bucket is logged and skipped, and whatever the other
//! buckets returned is handed back.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::NaiveDate;
use logbed_core::{keys, LogRecord};
use logbed_store::{LogStore, SortKeyRange};
use tracing::{debug, warn};

use crate::dates;
use crate::error::{QueryError, Result};

/// Knobs for a query engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    /// Return records from the buckets that succeed instead of failing
    /// the whole query when one bucket errors.
    pub allow_partial: bool,
}

/// Assembles multi-bucket date-range queries over a [`LogStore`].
pub struct QueryEngine {
    store: Arc<dyn LogStore>,
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self::with_options(store, QueryOptions::default())
    }

    pub fn with_options(store: Arc<dyn LogStore>, options: QueryOptions) -> Self {
        Self { store, options }
    }

    /// The bucket ids a nanosecond range touches: every bucket from the
    /// one containing the start bound through the one containing the end
    /// bound, and no others.
    pub fn buckets_for(range: SortKeyRange) -> RangeInclusive<i64> {
        let start = keys::month_bucket(range.start_ns.div_euclid(keys::NANOS_PER_SEC));
        let end = keys::month_bucket(range.end_ns.div_euclid(keys::NANOS_PER_SEC));
        start..=end
    }

    /// Fetch all records for `node_id` between `start` and `end`
    /// (calendar dates, end inclusive), in ascending time order.
    ///
    /// An empty result is `Ok(vec![])`, distinct from a failed query.
    pub async fn fetch(
        &self,
        node_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LogRecord>> {
        let node_id = node_id.trim();
        if node_id.is_empty() {
            return Err(QueryError::InvalidInput(
                "node id must not be empty".to_string(),
            ));
        }

        let range = dates::range_bounds(start, end)?;
        let buckets = Self::buckets_for(range);
        debug!(
            node_id,
            start = %start,
            end = %end,
            buckets = ?buckets,
            "assembling date-range query"
        );

        let mut records = Vec::new();
        for bucket in buckets {
            let partition_key = keys::partition_key(node_id, bucket);
            match self.store.query_range(&partition_key, range).await {
                Ok(mut page) => {
                    debug!(partition_key = %partition_key, count = page.len(), "bucket fetched");
                    records.append(&mut page);
                }
                Err(e) if self.options.allow_partial => {
                    warn!(partition_key = %partition_key, error = %e, "skipping failed bucket");
                }
                Err(e) => return Err(QueryError::Store(e)),
            }
        }
        Ok(records)
    }
}
