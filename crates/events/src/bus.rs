//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`JobEvent`]s to any number of subscribers. It is
//! shared via `Arc<EventBus>` between the worker pool and whatever wants to
//! observe job lifecycles.

use chrono::Utc;
use crunch_core::job_events::{MSG_TYPE_JOB_COMPLETED, MSG_TYPE_JOB_FAILED, MSG_TYPE_JOB_PROGRESS};
use crunch_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// JobEvent
// ---------------------------------------------------------------------------

/// A job lifecycle change that has already been persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// One of the `MSG_TYPE_JOB_*` constants in `crunch_core::job_events`.
    pub event_type: String,

    pub job_id: JobId,

    /// Event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: Timestamp,
}

impl JobEvent {
    fn new(event_type: &str, job_id: &str, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            job_id: job_id.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn progress(job_id: &str, completed: usize, total: usize, progress: f64) -> Self {
        Self::new(
            MSG_TYPE_JOB_PROGRESS,
            job_id,
            serde_json::json!({
                "completed": completed,
                "total": total,
                "progress": progress,
            }),
        )
    }

    pub fn completed(job_id: &str, total: usize) -> Self {
        Self::new(MSG_TYPE_JOB_COMPLETED, job_id, serde_json::json!({ "total": total }))
    }

    pub fn failed(job_id: &str, error: &str) -> Self {
        Self::new(MSG_TYPE_JOB_FAILED, job_id, serde_json::json!({ "error": error }))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use crunch_events::bus::{EventBus, JobEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(JobEvent::completed("job-1", 3));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped; the status store remains
    /// the source of truth.
    pub fn publish(&self, event: JobEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_progress() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(JobEvent::progress("job-1", 1, 4, 25.0));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, MSG_TYPE_JOB_PROGRESS);
        assert_eq!(received.job_id, "job-1");
        assert_eq!(received.payload["completed"], 1);
        assert_eq!(received.payload["total"], 4);
        assert_eq!(received.payload["progress"], 25.0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(JobEvent::failed("job-2", "boom"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, MSG_TYPE_JOB_FAILED);
        assert_eq!(e2.payload["error"], "boom");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(JobEvent::completed("orphan", 0));
    }
}
