//! Compute rules applied to every item of a job.
//!
//! An [`Operation`] is a closed set of named rules. Each rule is a pure,
//! deterministic function of the item value; [`compute`] adds the fixed
//! per-item cost that models a CPU-bound unit of work.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Factorial inputs are clamped to this value before evaluation.
pub const FACTORIAL_INPUT_CAP: i64 = 10;

/// Maximum accepted length of an operation name at submission.
pub const MAX_OPERATION_LEN: usize = 64;

/// Default operation when a submission does not name one.
pub const DEFAULT_OPERATION: &str = "square";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A compute rule could not produce an output for an item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComputationError {
    #[error("{operation} of {value} overflows a 64-bit integer")]
    Overflow { operation: Operation, value: i64 },

    #[error("factorial is not defined for negative values (got {value})")]
    NegativeFactorial { value: i64 },
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Named compute rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `value * value`.
    Square,
    /// `factorial(min(value, 10))`.
    Factorial,
    /// `value * 2`. Also the rule for any unrecognised operation name.
    Double,
}

impl Operation {
    /// Resolve an operation name.
    ///
    /// Unrecognised names resolve to [`Operation::Double`]; use
    /// [`Operation::is_known`] to detect that case.
    pub fn parse(name: &str) -> Self {
        match name {
            "square" => Self::Square,
            "factorial" => Self::Factorial,
            _ => Self::Double,
        }
    }

    /// Whether `name` is one of the explicitly named rules.
    pub fn is_known(name: &str) -> bool {
        matches!(name, "square" | "factorial" | "double")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Factorial => "factorial",
            Self::Double => "double",
        }
    }

    /// Apply the rule to a single value.
    pub fn apply(self, value: i64) -> Result<i64, ComputationError> {
        match self {
            Self::Square => value.checked_mul(value).ok_or(ComputationError::Overflow {
                operation: self,
                value,
            }),
            Self::Factorial => factorial(value.min(FACTORIAL_INPUT_CAP)),
            Self::Double => value.checked_mul(2).ok_or(ComputationError::Overflow {
                operation: self,
                value,
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `n!` for `0 <= n <= FACTORIAL_INPUT_CAP`.
fn factorial(n: i64) -> Result<i64, ComputationError> {
    if n < 0 {
        return Err(ComputationError::NegativeFactorial { value: n });
    }
    Ok((1..=n).product())
}

// ---------------------------------------------------------------------------
// Compute function
// ---------------------------------------------------------------------------

/// Evaluate `operation` on `value`, blocking the calling thread for `cost`
/// first.
///
/// Blocking is intentional: callers on an async runtime must run this on
/// the blocking pool.
pub fn compute(value: i64, operation: Operation, cost: Duration) -> Result<i64, ComputationError> {
    if !cost.is_zero() {
        std::thread::sleep(cost);
    }
    operation.apply(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
