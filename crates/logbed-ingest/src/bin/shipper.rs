//! logbed Shipper Binary
//!
//! Streams one running container's combined stdout/stderr into the store,
//! one record per line, until EOF, a fatal error, or a shutdown signal.
//! The shipper never retries: wrap it in a supervisor (systemd unit,
//! restart policy) if the deployment needs resilience.
//!
//! # Environment Variables
//!
//! - `NODE_ID`: node identity written into every partition key (required)
//! - `LOGBED_TABLE`: store table name (default: testbed)
//! - `CONTAINER_ID`: container to follow (default: first running container)
//! - `LOG_SINCE_SECS`: only ship output from the last N seconds (optional)
//! - `STORE_TIMEOUT_SECS`: per-operation store deadline (default: 10)
//! - `AWS_REGION` / credentials: ambient AWS configuration
//!
//! # Example
//!
//! ```bash
//! export NODE_ID=3
//! export LOGBED_TABLE=testbed
//! export AWS_REGION=us-west-1
//! cargo run --bin shipper
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use logbed_core::SystemClock;
use logbed_ingest::{DockerLogSource, IngestPipeline, LogSource, LogStreamOptions};
use logbed_store::{DynamoLogStore, TimeoutStore};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration from environment
    let node_id = std::env::var("NODE_ID").context("NODE_ID must be set")?;
    let table = std::env::var("LOGBED_TABLE")
        .unwrap_or_else(|_| logbed_store::dynamo::DEFAULT_TABLE.to_string());
    let container_id = std::env::var("CONTAINER_ID").ok();
    let since_secs = std::env::var("LOG_SINCE_SECS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok());
    let store_timeout = std::env::var("STORE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(10));

    info!("Configuration:");
    info!("  Node ID: {}", node_id);
    info!("  Table: {}", table);
    info!("  Container: {}", container_id.as_deref().unwrap_or("<first running>"));
    info!("  Since: {:?}", since_secs);
    info!("  Store timeout: {:?}", store_timeout);

    // Resolve the workload to follow
    let source = DockerLogSource::from_env()?;
    let workload_id = match container_id {
        Some(id) => id,
        None => source.first_running_container().await?,
    };
    info!("Following container {}", workload_id);

    // Connect to the store
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);
    let store = Arc::new(TimeoutStore::new(
        DynamoLogStore::new(client, table),
        store_timeout,
    ));

    // Open the log stream
    let options = LogStreamOptions {
        since_secs,
        ..Default::default()
    };
    let stream = source.open(&workload_id, &options).await?;

    // Cancel on SIGINT / SIGTERM
    let cancel = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
            info!("shutdown signal received");
            cancel.cancel();
        });
    }

    let pipeline = IngestPipeline::new(store, Arc::new(SystemClock::new()), node_id, workload_id);
    let persisted = pipeline.run(stream, cancel).await?;
    info!("Shipper exiting, {} records persisted", persisted);
    Ok(())
}
