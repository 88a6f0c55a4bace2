use std::sync::Arc;
use std::time::Duration;

use crunch_events::JobQueue;
use crunch_store::SharedStatusStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Job status store, shared with the worker pool.
    pub store: SharedStatusStore,
    /// Broker handoff for submitted jobs.
    pub queue: JobQueue,
    /// Retention window applied to the pending record at submission.
    pub status_ttl: Duration,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
