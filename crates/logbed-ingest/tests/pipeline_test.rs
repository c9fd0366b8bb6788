//! Integration tests for the ingestion pipeline against the in-memory
//! store and manual clock.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use logbed_core::{keys, ManualClock};
use logbed_ingest::{IngestError, IngestPipeline, LogStream};
use logbed_store::{LogStore, MemoryLogStore, SortKeyRange};
use tokio_util::sync::CancellationToken;

/// 2021-06-01T00:00:00Z.
const BASE_NANOS: i64 = 1_622_505_600_000_000_000;

fn byte_stream(chunks: Vec<&'static [u8]>) -> LogStream {
    stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c)))).boxed()
}

fn pipeline(store: Arc<MemoryLogStore>, clock: Arc<ManualClock>) -> IngestPipeline {
    IngestPipeline::new(store, clock, "1", "c1")
}

async fn all_records(store: &MemoryLogStore, node_id: &str) -> Vec<logbed_core::LogRecord> {
    let bucket = keys::month_bucket(BASE_NANOS / keys::NANOS_PER_SEC);
    store
        .query_range(
            &keys::partition_key(node_id, bucket),
            SortKeyRange::new(0, i64::MAX),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_two_lines_become_two_ordered_records() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    let persisted = pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTTfirst\nTTTTTTTTsecond\n"]),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(persisted, 2);

    let records = all_records(&store, "1").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].payload, "first");
    assert_eq!(records[1].payload, "second");
    assert_eq!(records[0].partition_key, records[1].partition_key);
    assert!(records[0].sort_key < records[1].sort_key);
    assert_eq!(records[0].workload_id, "c1");
}

#[tokio::test]
async fn test_sort_keys_come_from_the_injected_clock() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTTa\nTTTTTTTTb\n"]),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let records = all_records(&store, "1").await;
    assert_eq!(records[0].sort_key, keys::encode_sort_key(BASE_NANOS));
    assert_eq!(records[1].sort_key, keys::encode_sort_key(BASE_NANOS + 1));
}

#[tokio::test]
async fn test_line_split_across_chunks() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTThel", b"lo world\n"]),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let records = all_records(&store, "1").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload, "hello world");
}

#[tokio::test]
async fn test_short_line_halts_with_framing_error() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    let err = pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTTgood\nbad\nTTTTTTTTnever\n"]),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Framing { len: 3 }));

    // The good line before the malformed one was persisted; nothing after.
    let records = all_records(&store, "1").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload, "good");
}

#[tokio::test]
async fn test_store_write_failure_is_fatal() {
    let store = Arc::new(MemoryLogStore::new());
    store.fail_writes();
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    let err = pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTTone\nTTTTTTTTtwo\n"]),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::StoreWrite(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unterminated_tail_is_not_persisted() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    let persisted = pipeline(store.clone(), clock)
        .run(
            byte_stream(vec![b"TTTTTTTTwhole\nTTTTTTTTfragment"]),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(persisted, 1);
    assert_eq!(all_records(&store, "1").await[0].payload, "whole");
}

#[tokio::test]
async fn test_cancellation_stops_an_endless_stream() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));
    let cancel = CancellationToken::new();

    let endless: LogStream = stream::iter(vec![Ok(Bytes::from_static(
        b"TTTTTTTTalpha\nTTTTTTTTbeta\n",
    ))])
    .chain(stream::pending())
    .boxed();

    let pipe = pipeline(store.clone(), clock);
    let runner = {
        let cancel = cancel.clone();
        tokio::spawn(async move { pipe.run(endless, cancel).await })
    };

    // Wait for both lines to land, then cancel.
    for _ in 0..100 {
        if store.len().await == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.len().await, 2);
    cancel.cancel();

    let persisted = runner.await.unwrap().unwrap();
    assert_eq!(persisted, 2);
}

#[tokio::test]
async fn test_source_io_error_halts_the_pipeline() {
    let store = Arc::new(MemoryLogStore::new());
    let clock = Arc::new(ManualClock::new(BASE_NANOS));

    let failing: LogStream = stream::iter(vec![
        Ok(Bytes::from_static(b"TTTTTTTTok\n")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "daemon went away",
        )),
    ])
    .boxed();

    let err = pipeline(store.clone(), clock)
        .run(failing, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
    assert_eq!(store.len().await, 1);
}
