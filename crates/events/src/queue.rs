//! Broker handoff between job submission and the worker pool.
//!
//! A bounded `tokio::sync::mpsc` channel: every [`JobDispatch`] sent through
//! a [`JobQueue`] is received by exactly one caller of
//! [`JobReceiver::recv`], no matter how many worker contexts share the
//! receiver.

use std::sync::Arc;

use crunch_core::operation::Operation;
use crunch_core::types::JobId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};

/// Default number of dispatches that may wait for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Job queue is closed")]
    Closed,

    #[error("Job queue is full ({capacity} jobs waiting)")]
    Full { capacity: usize },
}

/// One job handed to the broker.
#[derive(Debug, Clone)]
pub struct JobDispatch {
    pub job_id: JobId,
    pub items: Vec<i64>,
    pub operation: Operation,
    /// Opaque delivery reference, minted when the dispatch is created.
    pub broker_ref: String,
}

impl JobDispatch {
    pub fn new(job_id: impl Into<JobId>, items: Vec<i64>, operation: Operation) -> Self {
        Self {
            job_id: job_id.into(),
            items,
            operation,
            broker_ref: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Sending half of the broker. Cheap to clone.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<JobDispatch>,
}

/// Receiving half of the broker, shared by all worker contexts.
#[derive(Clone)]
pub struct JobReceiver {
    receiver: Arc<Mutex<mpsc::Receiver<JobDispatch>>>,
}

impl JobQueue {
    /// Create a connected queue/receiver pair.
    pub fn channel(capacity: usize) -> (JobQueue, JobReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            JobQueue { sender },
            JobReceiver {
                receiver: Arc::new(Mutex::new(receiver)),
            },
        )
    }

    /// Hand a job to the broker without waiting. Fails with
    /// [`QueueError::Full`] when every slot is taken.
    pub fn send(&self, dispatch: JobDispatch) -> Result<(), QueueError> {
        let job_id = dispatch.job_id.clone();
        self.sender.try_send(dispatch).map_err(|err| match err {
            TrySendError::Full(_) => QueueError::Full {
                capacity: self.sender.max_capacity(),
            },
            TrySendError::Closed(_) => QueueError::Closed,
        })?;
        tracing::debug!(job_id = %job_id, "Job dispatched to queue");
        Ok(())
    }

    /// Number of dispatches waiting for a worker.
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

impl JobReceiver {
    /// Next dispatch, or `None` once every [`JobQueue`] is dropped and the
    /// backlog is drained.
    pub async fn recv(&self) -> Option<JobDispatch> {
        self.receiver.lock().await.recv().await
    }

    /// Take every dispatch already waiting in the queue without blocking.
    pub async fn drain(&self) -> Vec<JobDispatch> {
        let mut receiver = self.receiver.lock().await;
        let mut drained = Vec::new();
        while let Ok(dispatch) = receiver.try_recv() {
            drained.push(dispatch);
        }
        drained
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn dispatch_is_delivered_in_order() {
        let (queue, rx) = JobQueue::channel(8);
        queue
            .send(JobDispatch::new("a", vec![1], Operation::Square))
            .unwrap();
        queue
            .send(JobDispatch::new("b", vec![2], Operation::Double))
            .unwrap();
        assert_eq!(queue.queued(), 2);

        assert_eq!(rx.recv().await.unwrap().job_id, "a");
        assert_eq!(rx.recv().await.unwrap().job_id, "b");
        assert_eq!(queue.queued(), 0);
    }

    #[tokio::test]
    async fn each_dispatch_reaches_exactly_one_receiver() {
        let (queue, rx) = JobQueue::channel(64);
        for i in 0..20 {
            queue
                .send(JobDispatch::new(format!("job-{i}"), vec![], Operation::Square))
                .unwrap();
        }
        drop(queue);

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let rx = rx.clone();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Some(d) = rx.recv().await {
                        seen.push(d.job_id);
                    }
                    seen
                })
            })
            .collect();

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), 20);
        assert_eq!(unique.len(), 20);
    }

    #[tokio::test]
    async fn send_after_receiver_dropped_is_closed() {
        let (queue, rx) = JobQueue::channel(1);
        drop(rx);
        let result = queue.send(JobDispatch::new("x", vec![], Operation::Square));
        assert_matches!(result, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn send_to_full_queue_fails_without_waiting() {
        let (queue, _rx) = JobQueue::channel(1);
        queue
            .send(JobDispatch::new("a", vec![], Operation::Square))
            .unwrap();
        let result = queue.send(JobDispatch::new("b", vec![], Operation::Square));
        assert_matches!(result, Err(QueueError::Full { capacity: 1 }));
    }

    #[tokio::test]
    async fn drain_takes_the_backlog() {
        let (queue, rx) = JobQueue::channel(8);
        for id in ["a", "b", "c"] {
            queue
                .send(JobDispatch::new(id, vec![], Operation::Square))
                .unwrap();
        }

        let drained: Vec<_> = rx.drain().await.into_iter().map(|d| d.job_id).collect();
        assert_eq!(drained, ["a", "b", "c"]);
        assert_eq!(queue.queued(), 0);
        assert!(rx.drain().await.is_empty());
    }

    #[test]
    fn broker_refs_are_unique() {
        let a = JobDispatch::new("a", vec![], Operation::Square);
        let b = JobDispatch::new("a", vec![], Operation::Square);
        assert_ne!(a.broker_ref, b.broker_ref);
    }
}
