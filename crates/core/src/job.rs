//! Job status record and the state machine that mutates it.
//!
//! A [`JobStatus`] is the complete record persisted under `job:{id}`. The
//! store only ever receives whole records, so every transition here builds
//! the next full record in memory before it is written.
//!
//! ```text
//! pending ──> running ──> completed
//!                    └──> failed
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Every write sets the record to expire this many seconds later.
pub const STATUS_TTL_SECS: u64 = 3600;

/// Key namespace for job status records.
pub const JOB_KEY_PREFIX: &str = "job:";

/// Store key for a job id.
pub fn job_key(job_id: &str) -> String {
    format!("{JOB_KEY_PREFIX}{job_id}")
}

// ---------------------------------------------------------------------------
// JobState
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Completed and failed records never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Percentage of items processed, rounded to one decimal place.
///
/// Defined as 100 for an empty job.
pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// One processed item: the input and what the operation produced for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub input: i64,
    pub output: i64,
}

/// The persisted status record of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    pub total: usize,
    pub completed: usize,
    pub progress: f64,
    #[serde(default)]
    pub results: Vec<ItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reference to the broker delivery that carries this job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_ref: Option<String>,
}

impl JobStatus {
    /// Initial record written at submission.
    pub fn pending(total: usize, broker_ref: Option<String>) -> Self {
        Self {
            status: JobState::Pending,
            total,
            completed: 0,
            progress: 0.0,
            results: Vec::new(),
            error: None,
            broker_ref,
        }
    }

    /// Record written when the executor starts a job.
    pub fn running(total: usize, broker_ref: Option<String>) -> Self {
        Self {
            status: JobState::Running,
            ..Self::pending(total, broker_ref)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Append one successfully processed item and recompute progress.
    ///
    /// Only valid while running and while fewer than `total` items have been
    /// recorded.
    pub fn record_item(&mut self, input: i64, output: i64) -> Result<(), CoreError> {
        self.ensure_running("record an item on")?;
        if self.completed >= self.total {
            return Err(CoreError::Conflict(format!(
                "all {} items are already recorded",
                self.total
            )));
        }
        self.results.push(ItemResult { input, output });
        self.completed = self.results.len();
        self.progress = progress_percent(self.completed, self.total);
        Ok(())
    }

    /// Transition to completed. Requires every item to be recorded.
    pub fn complete(&mut self) -> Result<(), CoreError> {
        self.ensure_running("complete")?;
        if self.completed != self.total {
            return Err(CoreError::Conflict(format!(
                "cannot complete with {} of {} items recorded",
                self.completed, self.total
            )));
        }
        self.status = JobState::Completed;
        self.progress = 100.0;
        Ok(())
    }

    /// Transition to failed. Results recorded so far are kept.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        if self.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "cannot fail a job that is already {}",
                self.status.as_str()
            )));
        }
        self.status = JobState::Failed;
        self.error = Some(message.into());
        Ok(())
    }

    fn ensure_running(&self, action: &str) -> Result<(), CoreError> {
        if self.status != JobState::Running {
            return Err(CoreError::Conflict(format!(
                "cannot {action} a job that is {}",
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
