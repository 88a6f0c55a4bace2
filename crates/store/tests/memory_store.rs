//! Integration tests for the in-memory status store: full-record writes,
//! expiry windows, and prefix listing.

use std::sync::Arc;
use std::time::Duration;

use crunch_core::job::{JobState, JobStatus, STATUS_TTL_SECS};
use crunch_store::{MemoryStatusStore, StatusStore};

const TTL: Duration = Duration::from_secs(STATUS_TTL_SECS);

fn sample_record() -> JobStatus {
    let mut record = JobStatus::running(4, Some("delivery-1".into()));
    record.record_item(3, 9).unwrap();
    record.record_item(1, 1).unwrap();
    record.record_item(-2, 4).unwrap();
    record
}

// ---------------------------------------------------------------------------
// Test: a written record reads back structurally identical
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_then_read_returns_identical_record() {
    let store = MemoryStatusStore::new();
    let record = sample_record();

    store.put("job-1", &record, TTL).await.unwrap();
    let read = store.get("job-1").await.unwrap().expect("record should exist");

    assert_eq!(read, record);
    let inputs: Vec<i64> = read.results.iter().map(|r| r.input).collect();
    assert_eq!(inputs, vec![3, 1, -2]);
}

// ---------------------------------------------------------------------------
// Test: unknown job ids are not found
// ---------------------------------------------------------------------------

#[tokio::test]
async fn never_written_job_is_not_found() {
    let store = MemoryStatusStore::new();
    store.put("job-1", &sample_record(), TTL).await.unwrap();

    assert!(store.get("job-2").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: records expire after the retention window
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn record_expires_after_ttl() {
    let store = MemoryStatusStore::new();
    store.put("job-1", &sample_record(), TTL).await.unwrap();

    tokio::time::advance(TTL - Duration::from_secs(1)).await;
    assert!(store.get("job-1").await.unwrap().is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(store.get("job-1").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: every write resets the retention window
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn each_write_resets_expiry() {
    let store = MemoryStatusStore::new();
    let mut record = JobStatus::running(2, None);
    store.put("job-1", &record, TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(3000)).await;
    record.record_item(2, 4).unwrap();
    store.put("job-1", &record, TTL).await.unwrap();

    // 6000s after the first write, but only 3000s after the second.
    tokio::time::advance(Duration::from_secs(3000)).await;
    let read = store.get("job-1").await.unwrap().expect("window was reset");
    assert_eq!(read.completed, 1);
}

// ---------------------------------------------------------------------------
// Test: listing returns only live records under the prefix
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn list_returns_live_records_under_prefix() {
    let store = MemoryStatusStore::new();
    store.put("a", &JobStatus::pending(1, None), TTL).await.unwrap();
    store.put("b", &sample_record(), TTL).await.unwrap();
    store
        .put("c", &JobStatus::pending(2, None), Duration::from_secs(10))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;

    let records = store.list("job:").await.unwrap();
    let keys: Vec<&str> = records.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["job:a", "job:b"]);
    assert_eq!(records["job:b"].status, JobState::Running);

    assert!(store.list("other:").await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: concurrent writers on distinct jobs never see each other's counters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_jobs_keep_disjoint_records() {
    let store = Arc::new(MemoryStatusStore::new());

    let writer = |job_id: &'static str, total: usize| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut record = JobStatus::running(total, None);
            store.put(job_id, &record, TTL).await.unwrap();
            for v in 0..total as i64 {
                record.record_item(v, v).unwrap();
                store.put(job_id, &record, TTL).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let a = writer("job-a", 10);
    let b = writer("job-b", 3);
    a.await.unwrap();
    b.await.unwrap();

    let a = store.get("job-a").await.unwrap().unwrap();
    let b = store.get("job-b").await.unwrap().unwrap();
    assert_eq!((a.completed, a.total), (10, 10));
    assert_eq!((b.completed, b.total), (3, 3));
}
