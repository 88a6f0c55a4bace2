use crate::types::JobId;

/// Domain errors shared by every crunch crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No live record under this id (never existed, or expired).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: JobId },

    /// Rejected input, e.g. an oversized submission.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A job record refused a state transition.
    #[error("Invalid transition: {0}")]
    Conflict(String),
}
