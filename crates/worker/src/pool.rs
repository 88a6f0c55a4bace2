//! Pool of worker contexts consuming the broker queue.
//!
//! Each context takes one dispatch at a time and runs it to a terminal
//! state before asking for the next, so a job is always handled end-to-end
//! by exactly one context. Jobs in different contexts run concurrently.

use std::sync::Arc;
use std::time::Duration;

use crunch_events::JobReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::executor::{ExecutorError, TaskExecutor};

/// Failure message for jobs still queued when the pool stops.
const SHUTDOWN_REASON: &str = "worker pool shut down before the job started";

/// Handle to the running worker contexts.
pub struct WorkerPool {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    executor: Arc<TaskExecutor>,
    receiver: JobReceiver,
}

impl WorkerPool {
    /// Spawn `concurrency` worker contexts on the current runtime.
    pub fn start(executor: Arc<TaskExecutor>, receiver: JobReceiver, concurrency: usize) -> Self {
        let cancel = CancellationToken::new();
        let handles = (0..concurrency.max(1))
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    Arc::clone(&executor),
                    receiver.clone(),
                    cancel.clone(),
                ))
            })
            .collect::<Vec<_>>();

        tracing::info!(concurrency = handles.len(), "Worker pool started");
        Self {
            cancel,
            handles,
            executor,
            receiver,
        }
    }

    /// Stop taking new jobs and wait up to `timeout` for running jobs to
    /// reach a terminal state.
    ///
    /// Running jobs are never interrupted; contexts still busy when the
    /// timeout elapses are left to finish on their own. Dispatches still
    /// waiting in the queue are recorded as failed.
    pub async fn shutdown(self, timeout: Duration) {
        self.cancel.cancel();
        reject_backlog(&self.executor, &self.receiver).await;

        let all = join_handles(self.handles);
        if tokio::time::timeout(timeout, all).await.is_err() {
            tracing::warn!("Worker pool shutdown timed out with jobs still running");
        } else {
            tracing::info!("Worker pool stopped");
        }
    }
}

/// Fail every dispatch left in the queue so its pending record does not
/// linger until expiry.
async fn reject_backlog(executor: &TaskExecutor, receiver: &JobReceiver) {
    let backlog = receiver.drain().await;
    if backlog.is_empty() {
        return;
    }
    tracing::warn!(jobs = backlog.len(), "Rejecting queued jobs at shutdown");

    for dispatch in backlog {
        let job_id = dispatch.job_id.clone();
        if let Err(err) = executor.reject(dispatch, SHUTDOWN_REASON).await {
            tracing::error!(job_id = %job_id, error = %err, "Failed to record rejected job");
        }
    }
}

async fn join_handles(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

async fn worker_loop(
    worker: usize,
    executor: Arc<TaskExecutor>,
    receiver: JobReceiver,
    cancel: CancellationToken,
) {
    loop {
        let dispatch = tokio::select! {
            _ = cancel.cancelled() => break,
            next = receiver.recv() => match next {
                Some(dispatch) => dispatch,
                None => {
                    tracing::info!(worker, "Job queue closed");
                    break;
                }
            },
        };

        let job_id = dispatch.job_id.clone();
        tracing::debug!(worker, job_id = %job_id, "Job received");

        match executor.run(dispatch).await {
            Ok(outcome) => {
                tracing::info!(
                    worker,
                    job_id = %outcome.job_id,
                    results = outcome.results.len(),
                    "Job finished",
                );
            }
            Err(err @ ExecutorError::Store { .. }) => {
                tracing::error!(
                    worker,
                    job_id = %job_id,
                    error = %err,
                    "Job lost to store failure",
                );
            }
            Err(err) => {
                tracing::warn!(
                    worker,
                    job_id = %job_id,
                    error = %err,
                    "Job finished with failure",
                );
            }
        }
    }
    tracing::debug!(worker, "Worker context stopped");
}
