//! Job submission payload and its validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::JobState;
use crate::operation::{Operation, DEFAULT_OPERATION, MAX_OPERATION_LEN};
use crate::types::JobId;

/// Maximum number of items accepted in a single job.
pub const MAX_ITEMS_PER_JOB: usize = 10_000;

/// DTO for submitting a job via `POST /jobs` or `POST /api/v1/jobs`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJob {
    /// Items to process, in order.
    pub numbers: Vec<i64>,
    /// Operation name. Defaults to `square`.
    #[serde(default = "default_operation")]
    pub operation: String,
}

fn default_operation() -> String {
    DEFAULT_OPERATION.to_string()
}

/// Response body for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: JobId,
    pub status: JobState,
}

impl SubmitJob {
    /// Check size limits and resolve the operation.
    ///
    /// Rules:
    /// - At most `MAX_ITEMS_PER_JOB` items. An empty list is accepted.
    /// - Operation name at most `MAX_OPERATION_LEN` characters.
    pub fn validate(&self) -> Result<Operation, CoreError> {
        if self.numbers.len() > MAX_ITEMS_PER_JOB {
            return Err(CoreError::Validation(format!(
                "A job may have at most {MAX_ITEMS_PER_JOB} numbers (got {})",
                self.numbers.len()
            )));
        }
        if self.operation.chars().count() > MAX_OPERATION_LEN {
            return Err(CoreError::Validation(format!(
                "Operation name must not exceed {MAX_OPERATION_LEN} characters"
            )));
        }
        Ok(Operation::parse(&self.operation))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn submit(numbers: Vec<i64>, operation: &str) -> SubmitJob {
        SubmitJob {
            numbers,
            operation: operation.to_string(),
        }
    }

    #[test]
    fn operation_defaults_to_square() {
        let input: SubmitJob = serde_json::from_str(r#"{"numbers": [1, 2]}"#).unwrap();
        assert_eq!(input.operation, "square");
        assert_eq!(input.validate().unwrap(), Operation::Square);
    }

    #[test]
    fn empty_numbers_are_accepted() {
        assert_eq!(submit(vec![], "factorial").validate().unwrap(), Operation::Factorial);
    }

    #[test]
    fn unknown_operation_resolves_to_double() {
        assert_eq!(submit(vec![7], "cube").validate().unwrap(), Operation::Double);
    }

    #[test]
    fn too_many_numbers_rejected() {
        let input = submit(vec![1; MAX_ITEMS_PER_JOB + 1], "square");
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn max_numbers_accepted() {
        let input = submit(vec![1; MAX_ITEMS_PER_JOB], "square");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn long_operation_name_rejected() {
        let name = "x".repeat(MAX_OPERATION_LEN + 1);
        assert_matches!(submit(vec![1], &name).validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn operation_limit_counts_characters_not_bytes() {
        // 64 two-byte characters: 128 bytes, still within the limit.
        let name = "é".repeat(MAX_OPERATION_LEN);
        assert_eq!(submit(vec![1], &name).validate().unwrap(), Operation::Double);

        let name = "é".repeat(MAX_OPERATION_LEN + 1);
        assert_matches!(submit(vec![1], &name).validate(), Err(CoreError::Validation(_)));
    }
}
