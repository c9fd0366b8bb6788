//! In-Memory Store Implementation
//!
//! Test backend for the [`LogStore`] trait. Keeps records in a `BTreeMap`
//! keyed `(partition_key, sort_key)` so range scans come back in the same
//! lexicographic sort-key order the production backend returns.
//!
//! Failure injection (`fail_partition`, `fail_writes`) exists so callers
//! can exercise the fatal-on-write and all-or-nothing query paths without
//! a real store misbehaving on cue.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use logbed_core::LogRecord;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::{LogStore, SortKeyRange};

/// In-memory `LogStore` for tests.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    records: RwLock<BTreeMap<(String, String), LogRecord>>,
    failing_partitions: RwLock<HashSet<String>>,
    fail_writes: AtomicBool,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Make every subsequent query against `partition_key` fail.
    pub async fn fail_partition(&self, partition_key: &str) {
        self.failing_partitions
            .write()
            .await
            .insert(partition_key.to_string());
    }

    /// Make every subsequent `put` fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn put(&self, record: &LogRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Write("injected write failure".to_string()));
        }
        self.records.write().await.insert(
            (record.partition_key.clone(), record.sort_key.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn query_range(&self, partition_key: &str, range: SortKeyRange) -> Result<Vec<LogRecord>> {
        if self.failing_partitions.read().await.contains(partition_key) {
            return Err(StoreError::Query(format!(
                "injected query failure for partition '{}'",
                partition_key
            )));
        }

        let lo = (partition_key.to_string(), range.encoded_start());
        let hi = (partition_key.to_string(), range.encoded_end());
        let records = self.records.read().await;
        Ok(records
            .range((Bound::Included(lo), Bound::Excluded(hi)))
            .map(|(_, rec)| rec.clone())
            .collect())
    }
}
