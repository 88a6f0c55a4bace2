//! Periodic sweep of expired job status records.
//!
//! Expired records are already invisible to readers; this reclaims the
//! memory they hold. Backends with native expiry treat the sweep as a no-op.

use std::time::Duration;

use crunch_store::SharedStatusStore;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Run the retention sweep loop until `cancel` is triggered.
pub async fn run(store: SharedStatusStore, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Status retention sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Status retention sweep stopping");
                break;
            }
            _ = interval.tick() => match store.purge_expired().await {
                Ok(0) => tracing::debug!("Status retention: nothing expired"),
                Ok(purged) => tracing::info!(purged, "Status retention: purged expired records"),
                Err(e) => tracing::error!(error = %e, "Status retention: sweep failed"),
            },
        }
    }
}
