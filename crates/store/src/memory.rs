//! In-process status store.
//!
//! Records are kept as serialized JSON, exactly as an external key-value
//! store would hold them, so a read always decodes a fresh copy. Expiry is
//! measured on the Tokio clock.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use crunch_core::job::{job_key, JobStatus};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{StatusStore, StoreError};

/// Expired entries are swept on write once the map grows past this size.
const SWEEP_THRESHOLD: usize = 1024;

struct Entry {
    payload: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Status store backed by a `HashMap` behind a Tokio `RwLock`.
#[derive(Default)]
pub struct MemoryStatusStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn put(
        &self,
        job_id: &str,
        record: &JobStatus,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, entry| entry.is_live(now));
        }
        entries.insert(
            job_key(job_id),
            Entry {
                payload,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<JobStatus>, StoreError> {
        let entries = self.entries.read().await;
        match entries.get(&job_key(job_id)) {
            Some(entry) if entry.is_live(Instant::now()) => {
                Ok(Some(serde_json::from_str(&entry.payload)?))
            }
            _ => Ok(None),
        }
    }

    async fn list(&self, prefix: &str) -> Result<BTreeMap<String, JobStatus>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let mut records = BTreeMap::new();
        for (key, entry) in entries.iter() {
            if key.starts_with(prefix) && entry.is_live(now) {
                records.insert(key.clone(), serde_json::from_str(&entry.payload)?);
            }
        }
        Ok(records)
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
