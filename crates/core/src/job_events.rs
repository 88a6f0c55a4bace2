//! Event type constants for job lifecycle notifications.
//!
//! Published on the in-process event bus by the task executor after each
//! status write lands in the store.

/// Progress update after an item was processed.
pub const MSG_TYPE_JOB_PROGRESS: &str = "job_progress";

/// Job completed successfully.
pub const MSG_TYPE_JOB_COMPLETED: &str = "job_completed";

/// Job failed with an error.
pub const MSG_TYPE_JOB_FAILED: &str = "job_failed";
