//! Per-operation deadline wrapper for any `LogStore`.
//!
//! Neither ingestion nor the query engine imposes timeouts of its own, so
//! a hung store call would block a pipeline indefinitely. `TimeoutStore`
//! bounds every operation and surfaces expiry as `StoreError::Timeout`,
//! which callers treat exactly like any other fatal store error.

use std::time::Duration;

use async_trait::async_trait;
use logbed_core::LogRecord;
use tokio::time::timeout;

use crate::error::{Result, StoreError};
use crate::store::{LogStore, SortKeyRange};

/// Wraps a `LogStore`, failing any operation that exceeds `deadline`.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    deadline: Duration,
}

impl<S> TimeoutStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl<S: LogStore> LogStore for TimeoutStore<S> {
    async fn put(&self, record: &LogRecord) -> Result<()> {
        timeout(self.deadline, self.inner.put(record))
            .await
            .map_err(|_| StoreError::Timeout(self.deadline))?
    }

    async fn query_range(&self, partition_key: &str, range: SortKeyRange) -> Result<Vec<LogRecord>> {
        timeout(self.deadline, self.inner.query_range(partition_key, range))
            .await
            .map_err(|_| StoreError::Timeout(self.deadline))?
    }
}
