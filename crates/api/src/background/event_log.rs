//! Structured logging of job lifecycle events.
//!
//! Subscribes to the event bus and emits one log line per persisted job
//! transition. Runs until `cancel` is triggered or the bus is dropped.

use crunch_core::job_events::MSG_TYPE_JOB_FAILED;
use crunch_events::JobEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

/// Run the event logging loop.
pub async fn run(mut events: broadcast::Receiver<JobEvent>, cancel: CancellationToken) {
    tracing::info!("Job event logger started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job event logger stopping");
                break;
            }
            received = events.recv() => match received {
                Ok(event) if event.event_type == MSG_TYPE_JOB_FAILED => {
                    tracing::warn!(
                        job_id = %event.job_id,
                        payload = %event.payload,
                        "Job event: {}",
                        event.event_type,
                    );
                }
                Ok(event) => {
                    tracing::debug!(
                        job_id = %event.job_id,
                        payload = %event.payload,
                        "Job event: {}",
                        event.event_type,
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Job event logger lagged behind");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Event bus closed, job event logger stopping");
                    break;
                }
            },
        }
    }
}
