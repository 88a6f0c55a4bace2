//! Domain types shared by the crunch API server and worker.
//!
//! Pure data and functions only: the job status record and its state
//! machine, the compute operations, the submission payload, error types,
//! and event constants.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod job;
pub mod job_events;
pub mod operation;
pub mod submission;
pub mod types;
