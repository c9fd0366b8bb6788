//! Ingestion Pipeline
//!
//! Two stages connected by a single-slot channel:
//!
//! - **reader**: deframes lines off the source stream and hands each
//!   payload across the channel. With capacity 1, the reader can be at
//!   most one line ahead of the writer; when the store is slow the channel
//!   fills, the reader blocks, and backpressure reaches the source. No
//!   silent drops, no unbounded buffering.
//! - **writer**: for each payload, reads the clock once, derives both keys
//!   from that instant, and persists exactly one record before taking the
//!   next line.
//!
//! The pipeline ends at stream EOF, on the first error (framing, source,
//! store write - all fatal), or on external cancellation. Cancellation
//! stops consumption promptly; a line already handed to the writer may
//! still be lost, which is the accepted shutdown window.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use logbed_core::{Clock, LogRecord};
use logbed_store::LogStore;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::error::{IngestError, Result};
use crate::framing::LogLineDecoder;
use crate::source::LogStream;

/// Streaming ingestion of one workload's log lines for one node.
pub struct IngestPipeline {
    store: Arc<dyn LogStore>,
    clock: Arc<dyn Clock>,
    node_id: String,
    workload_id: String,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn LogStore>,
        clock: Arc<dyn Clock>,
        node_id: impl Into<String>,
        workload_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            node_id: node_id.into(),
            workload_id: workload_id.into(),
        }
    }

    /// Consume `lines` until EOF, the first error, or cancellation.
    ///
    /// Returns the number of records persisted. An `Err` means the
    /// pipeline halted mid-stream; records persisted before the failure
    /// remain in the store (at-least-once, no rollback).
    pub async fn run(&self, lines: LogStream, cancel: CancellationToken) -> Result<u64> {
        let mut framed = FramedRead::new(StreamReader::new(lines), LogLineDecoder::new());

        // Single in-flight line between the stages.
        let (tx, mut rx) = mpsc::channel::<Result<Bytes>>(1);

        let reader_cancel = cancel.clone();
        let reader = tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    _ = reader_cancel.cancelled() => break,
                    next = framed.next() => next,
                };
                let Some(item) = next else {
                    break; // end of stream
                };
                let halt = item.is_err();
                if tx.send(item).await.is_err() {
                    break; // writer is gone
                }
                if halt {
                    break;
                }
            }
        });

        let mut persisted = 0u64;
        let result = loop {
            let item = tokio::select! {
                _ = cancel.cancelled() => break Ok(persisted),
                item = rx.recv() => item,
            };
            let Some(item) = item else {
                break Ok(persisted);
            };
            let payload = match item {
                Ok(payload) => payload,
                Err(e) => break Err(e),
            };

            let nanos = self.clock.now_nanos();
            let record = LogRecord::at_instant(
                &self.node_id,
                &self.workload_id,
                nanos,
                String::from_utf8_lossy(&payload).into_owned(),
            );

            if let Err(e) = self.store.put(&record).await {
                break Err(IngestError::StoreWrite(e));
            }
            persisted += 1;
            trace!(sort_key = %record.sort_key, bytes = record.estimated_size(), "persisted line");
        };

        drop(rx);
        let _ = reader.await;

        match &result {
            Ok(count) => info!(
                node_id = %self.node_id,
                workload_id = %self.workload_id,
                persisted = count,
                "ingest pipeline finished"
            ),
            Err(e) => error!(
                node_id = %self.node_id,
                workload_id = %self.workload_id,
                persisted,
                error = %e,
                "ingest pipeline halted"
            ),
        }
        result
    }
}
