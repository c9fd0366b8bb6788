//! DynamoDB Store Implementation
//!
//! Production backend for the [`LogStore`] trait. One table holds every
//! record, keyed by:
//! - `nodemonthcat` (S, partition key): `{node_id}.{month_bucket}.dockerlogs`
//! - `timestamp` (S, sort key): zero-padded nanoseconds
//!
//! with the line itself under a `dockerlogs` map (`containerID`, `data`).
//!
//! ## Range filter
//! DynamoDB key conditions allow exactly one condition on the sort key, so
//! the half-open `[lo, hi)` range is expressed as `BETWEEN lo AND hi-1`;
//! sort keys are integer nanoseconds, so the two are equivalent.
//!
//! ## Durability
//! The store, not this process, is responsible for write durability and
//! per-item atomicity. `put` maps one record to one `PutItem`; there is no
//! batching and no retry here.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use logbed_core::LogRecord;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{LogStore, SortKeyRange};

/// Default table name, from the original testbed deployment.
pub const DEFAULT_TABLE: &str = "testbed";

const ATTR_PARTITION: &str = "nodemonthcat";
const ATTR_SORT: &str = "timestamp";
const ATTR_PAYLOAD: &str = "dockerlogs";
const ATTR_CONTAINER_ID: &str = "containerID";
const ATTR_DATA: &str = "data";

/// `LogStore` backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoLogStore {
    client: Client,
    table: String,
}

impl DynamoLogStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl LogStore for DynamoLogStore {
    async fn put(&self, record: &LogRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| StoreError::Write(format!("{}", DisplayErrorContext(&e))))?;

        debug!(
            partition_key = %record.partition_key,
            sort_key = %record.sort_key,
            bytes = record.payload.len(),
            "put record"
        );
        Ok(())
    }

    async fn query_range(&self, partition_key: &str, range: SortKeyRange) -> Result<Vec<LogRecord>> {
        let mut items = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("#pk = :pk AND #ts BETWEEN :lo AND :hi")
            .expression_attribute_names("#pk", ATTR_PARTITION)
            .expression_attribute_names("#ts", ATTR_SORT)
            .expression_attribute_values(":pk", AttributeValue::S(partition_key.to_string()))
            .expression_attribute_values(":lo", AttributeValue::S(range.encoded_start()))
            .expression_attribute_values(":hi", AttributeValue::S(range.encoded_end_inclusive()))
            .projection_expression("#pk, #ts, dockerlogs")
            .into_paginator()
            .items()
            .send();

        let mut records = Vec::new();
        while let Some(item) = items.next().await {
            let item = item.map_err(|e| StoreError::Query(format!("{}", DisplayErrorContext(&e))))?;
            records.push(item_to_record(&item)?);
        }

        debug!(
            partition_key = %partition_key,
            count = records.len(),
            "queried range"
        );
        Ok(records)
    }
}

/// Map a record to its DynamoDB item layout.
fn record_to_item(record: &LogRecord) -> HashMap<String, AttributeValue> {
    let payload = HashMap::from([
        (
            ATTR_CONTAINER_ID.to_string(),
            AttributeValue::S(record.workload_id.clone()),
        ),
        (
            ATTR_DATA.to_string(),
            AttributeValue::S(record.payload.clone()),
        ),
    ]);

    HashMap::from([
        (
            ATTR_PARTITION.to_string(),
            AttributeValue::S(record.partition_key.clone()),
        ),
        (
            ATTR_SORT.to_string(),
            AttributeValue::S(record.sort_key.clone()),
        ),
        (ATTR_PAYLOAD.to_string(), AttributeValue::M(payload)),
    ])
}

/// Map a DynamoDB item back to a record.
fn item_to_record(item: &HashMap<String, AttributeValue>) -> Result<LogRecord> {
    let payload = item
        .get(ATTR_PAYLOAD)
        .and_then(|v| v.as_m().ok())
        .ok_or_else(|| missing(ATTR_PAYLOAD))?;

    Ok(LogRecord {
        partition_key: get_s(item, ATTR_PARTITION)?,
        sort_key: get_s(item, ATTR_SORT)?,
        workload_id: get_s(payload, ATTR_CONTAINER_ID)?,
        payload: get_s(payload, ATTR_DATA)?,
    })
}

fn get_s(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| missing(name))
}

fn missing(name: &str) -> StoreError {
    StoreError::Encoding(format!("item is missing string attribute '{}'", name))
}
