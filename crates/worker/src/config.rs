use std::time::Duration;

use crunch_core::job::STATUS_TTL_SECS;
use crunch_events::queue::DEFAULT_QUEUE_CAPACITY;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of worker contexts running jobs concurrently (default: `4`).
    pub concurrency: usize,
    /// Simulated cost of computing one item (default: `500ms`).
    pub item_delay: Duration,
    /// Retention window applied on every status write (default: `3600s`).
    pub status_ttl: Duration,
    /// Dispatches that may wait for a free worker (default: `1024`).
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            item_delay: Duration::from_millis(500),
            status_ttl: Duration::from_secs(STATUS_TTL_SECS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `WORKER_CONCURRENCY` | `4`     |
    /// | `ITEM_DELAY_MS`      | `500`   |
    /// | `STATUS_TTL_SECS`    | `3600`  |
    /// | `QUEUE_CAPACITY`     | `1024`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .map(|v| v.parse().expect("WORKER_CONCURRENCY must be a valid usize"))
            .unwrap_or(defaults.concurrency);

        let item_delay_ms: u64 = std::env::var("ITEM_DELAY_MS")
            .map(|v| v.parse().expect("ITEM_DELAY_MS must be a valid u64"))
            .unwrap_or(defaults.item_delay.as_millis() as u64);

        let status_ttl_secs: u64 = std::env::var("STATUS_TTL_SECS")
            .map(|v| v.parse().expect("STATUS_TTL_SECS must be a valid u64"))
            .unwrap_or(STATUS_TTL_SECS);

        let queue_capacity: usize = std::env::var("QUEUE_CAPACITY")
            .map(|v| v.parse().expect("QUEUE_CAPACITY must be a valid usize"))
            .unwrap_or(defaults.queue_capacity);

        Self {
            concurrency: concurrency.max(1),
            item_delay: Duration::from_millis(item_delay_ms),
            status_ttl: Duration::from_secs(status_ttl_secs),
            queue_capacity: queue_capacity.max(1),
        }
    }
}
