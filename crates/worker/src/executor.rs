//! Task executor: runs one job end-to-end.
//!
//! Drives the job's record through `running → completed | failed`, computing
//! items strictly in input order and writing the full record to the status
//! store after every step. A write must land before the next item starts.
//!
//! Failures never panic out of [`TaskExecutor::run`]; they come back as an
//! [`ExecutorError`] for the broker integration to inspect.

use std::sync::Arc;
use std::time::Duration;

use crunch_core::error::CoreError;
use crunch_core::job::{ItemResult, JobStatus};
use crunch_core::operation::{compute, ComputationError, Operation};
use crunch_core::types::JobId;
use crunch_events::{EventBus, JobDispatch, JobEvent};
use crunch_store::{SharedStatusStore, StoreError};

use crate::config::WorkerConfig;

// ---------------------------------------------------------------------------
// Errors and outcome
// ---------------------------------------------------------------------------

/// Why a job did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// An item could not be computed. The job is recorded as failed.
    #[error("Job {job_id} failed on item {index}: {source}")]
    Computation {
        job_id: JobId,
        index: usize,
        #[source]
        source: ComputationError,
    },

    /// The blocking computation task died before returning.
    #[error("Job {job_id} aborted on item {index}: {reason}")]
    Aborted {
        job_id: JobId,
        index: usize,
        reason: String,
    },

    /// A status write failed. The failed record may not have persisted.
    #[error("Status write failed for job {job_id}: {source}")]
    Store {
        job_id: JobId,
        #[source]
        source: StoreError,
    },

    /// The record rejected a transition.
    #[error("Job {job_id} rejected a state transition: {source}")]
    State {
        job_id: JobId,
        #[source]
        source: CoreError,
    },
}

impl ExecutorError {
    /// Human-readable message stored in the failed record.
    fn failure_message(&self) -> String {
        match self {
            Self::Computation { source, .. } => source.to_string(),
            Self::Aborted { reason, .. } => format!("computation aborted: {reason}"),
            Self::Store { source, .. } => source.to_string(),
            Self::State { source, .. } => source.to_string(),
        }
    }
}

/// A job that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub results: Vec<ItemResult>,
}

// ---------------------------------------------------------------------------
// TaskExecutor
// ---------------------------------------------------------------------------

/// Runs jobs against an injected status store and event bus.
///
/// One executor is shared by every worker context; each [`run`] call owns
/// its job's record exclusively, so no locking is needed.
///
/// [`run`]: TaskExecutor::run
pub struct TaskExecutor {
    store: SharedStatusStore,
    events: Arc<EventBus>,
    item_cost: Duration,
    status_ttl: Duration,
}

impl TaskExecutor {
    pub fn new(store: SharedStatusStore, events: Arc<EventBus>, config: &WorkerConfig) -> Self {
        Self {
            store,
            events,
            item_cost: config.item_delay,
            status_ttl: config.status_ttl,
        }
    }

    /// Execute one dispatched job to a terminal state.
    pub async fn run(&self, dispatch: JobDispatch) -> Result<JobOutcome, ExecutorError> {
        let JobDispatch {
            job_id,
            items,
            operation,
            broker_ref,
        } = dispatch;

        // Start.
        let mut record = JobStatus::running(items.len(), Some(broker_ref));
        if let Err(source) = self.write(&job_id, &record).await {
            return Err(self.abandon(&job_id, record, source).await);
        }
        self.events
            .publish(JobEvent::progress(&job_id, 0, record.total, record.progress));

        tracing::info!(
            job_id = %job_id,
            total = record.total,
            operation = %operation,
            "Job started",
        );

        // Steps.
        for (index, item) in items.iter().copied().enumerate() {
            let output = match self.compute_item(&job_id, index, item, operation).await {
                Ok(output) => output,
                Err(err) => return Err(self.abort(&job_id, record, err).await),
            };

            if let Err(source) = record.record_item(item, output) {
                let err = ExecutorError::State {
                    job_id: job_id.clone(),
                    source,
                };
                return Err(self.abort(&job_id, record, err).await);
            }

            if let Err(source) = self.write(&job_id, &record).await {
                return Err(self.abandon(&job_id, record, source).await);
            }
            self.events.publish(JobEvent::progress(
                &job_id,
                record.completed,
                record.total,
                record.progress,
            ));

            tracing::debug!(
                job_id = %job_id,
                completed = record.completed,
                total = record.total,
                progress = record.progress,
                "Item processed",
            );
        }

        // Finish.
        self.finish(&job_id, record).await
    }

    /// Write the completed record. Also the path for empty jobs.
    async fn finish(&self, job_id: &str, record: JobStatus) -> Result<JobOutcome, ExecutorError> {
        let mut done = record.clone();
        if let Err(source) = done.complete() {
            let err = ExecutorError::State {
                job_id: job_id.to_string(),
                source,
            };
            return Err(self.abort(job_id, record, err).await);
        }

        if let Err(source) = self.write(job_id, &done).await {
            return Err(self.abandon(job_id, record, source).await);
        }
        self.events.publish(JobEvent::completed(job_id, done.total));

        tracing::info!(job_id = %job_id, total = done.total, "Job completed");

        Ok(JobOutcome {
            job_id: job_id.to_string(),
            results: done.results,
        })
    }

    /// Record a dispatch that will never run as failed, without starting it.
    pub async fn reject(&self, dispatch: JobDispatch, reason: &str) -> Result<(), ExecutorError> {
        let JobDispatch {
            job_id,
            items,
            broker_ref,
            ..
        } = dispatch;

        let mut record = JobStatus::pending(items.len(), Some(broker_ref));
        record.fail(reason).map_err(|source| ExecutorError::State {
            job_id: job_id.clone(),
            source,
        })?;

        if let Err(source) = self.write(&job_id, &record).await {
            return Err(ExecutorError::Store { job_id, source });
        }
        self.events.publish(JobEvent::failed(&job_id, reason));
        tracing::warn!(job_id = %job_id, reason, "Job rejected before it started");
        Ok(())
    }

    /// Run the operation for one item on the blocking pool.
    async fn compute_item(
        &self,
        job_id: &str,
        index: usize,
        item: i64,
        operation: Operation,
    ) -> Result<i64, ExecutorError> {
        let cost = self.item_cost;
        match tokio::task::spawn_blocking(move || compute(item, operation, cost)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(ExecutorError::Computation {
                job_id: job_id.to_string(),
                index,
                source,
            }),
            Err(join_err) => Err(ExecutorError::Aborted {
                job_id: job_id.to_string(),
                index,
                reason: join_err.to_string(),
            }),
        }
    }

    /// Record a job failure and stop. Results written so far are kept.
    async fn abort(
        &self,
        job_id: &str,
        mut record: JobStatus,
        err: ExecutorError,
    ) -> ExecutorError {
        let message = err.failure_message();
        tracing::warn!(job_id = %job_id, error = %message, "Job failed");

        if record.fail(message.clone()).is_err() {
            return err;
        }
        match self.write(job_id, &record).await {
            Ok(()) => self.events.publish(JobEvent::failed(job_id, &message)),
            Err(store_err) => tracing::error!(
                job_id = %job_id,
                error = %store_err,
                "Failed to persist failed job status",
            ),
        }
        err
    }

    /// A status write failed: log it, make one best-effort attempt to
    /// record the job as failed, and give up.
    async fn abandon(
        &self,
        job_id: &str,
        mut record: JobStatus,
        source: StoreError,
    ) -> ExecutorError {
        tracing::error!(
            job_id = %job_id,
            completed = record.completed,
            total = record.total,
            error = %source,
            "Status write failed, abandoning job",
        );

        let message = source.to_string();
        if record.fail(message.clone()).is_ok() {
            match self.write(job_id, &record).await {
                Ok(()) => self.events.publish(JobEvent::failed(job_id, &message)),
                Err(retry_err) => tracing::error!(
                    job_id = %job_id,
                    error = %retry_err,
                    "Best-effort failure write also failed",
                ),
            }
        }

        ExecutorError::Store {
            job_id: job_id.to_string(),
            source,
        }
    }

    async fn write(&self, job_id: &str, record: &JobStatus) -> Result<(), StoreError> {
        self.store.put(job_id, record, self.status_ttl).await
    }
}
