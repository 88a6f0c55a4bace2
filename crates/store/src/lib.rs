//! Expiring key-value persistence for job status records.
//!
//! [`StatusStore`] is the only seam between the task executor (the single
//! writer of a job's record) and everything that reads job status. Every
//! write is a full overwrite that resets the record's time-to-live; there
//! are no partial updates.
//!
//! Backends:
//!
//! - [`MemoryStatusStore`]: in-process map, the default.
//! - `RedisStatusStore`: behind the `redis` feature, `SETEX`/`GET`/`KEYS`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crunch_core::job::JobStatus;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStatusStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStatusStore;

/// Errors raised by a status store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("Status store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be encoded, or a stored value is not a record.
    #[error("Malformed status record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shared handle to a status store, created once per process.
pub type SharedStatusStore = Arc<dyn StatusStore>;

/// Expiring key-value store of [`JobStatus`] records keyed by job id.
///
/// Records live under `job:{job_id}` (see [`crunch_core::job::job_key`]).
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Replace the whole record for `job_id` and reset its expiry to `ttl`.
    ///
    /// The write is visible to readers as soon as this returns.
    async fn put(
        &self,
        job_id: &str,
        record: &JobStatus,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Current record, or `None` if the job is unknown or has expired.
    async fn get(&self, job_id: &str) -> Result<Option<JobStatus>, StoreError>;

    /// Every live record whose key starts with `prefix`, keyed by full key.
    async fn list(&self, prefix: &str) -> Result<BTreeMap<String, JobStatus>, StoreError>;

    /// Reclaim space held by expired records. Returns how many were dropped.
    ///
    /// Backends that expire keys themselves keep the default no-op.
    async fn purge_expired(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}

/// Open the process-wide status store.
///
/// A Redis URL selects the Redis backend when the `redis` feature is
/// compiled in; otherwise the in-memory store is used.
pub async fn connect(redis_url: Option<&str>) -> Result<SharedStatusStore, StoreError> {
    match redis_url {
        #[cfg(feature = "redis")]
        Some(url) => {
            let store = RedisStatusStore::connect(url).await?;
            tracing::info!("Using Redis status store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => {
            tracing::warn!(
                "REDIS_URL is set but crunch-store was built without the `redis` feature; \
                 falling back to the in-memory status store"
            );
            Ok(Arc::new(MemoryStatusStore::new()))
        }
        None => {
            tracing::info!("Using in-memory status store");
            Ok(Arc::new(MemoryStatusStore::new()))
        }
    }
}
