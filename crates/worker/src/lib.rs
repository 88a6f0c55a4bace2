//! `crunch-worker` library crate.
//!
//! The task executor that runs one job end-to-end against the status store,
//! and the pool of worker contexts that pull jobs from the broker queue.

pub mod config;
pub mod executor;
pub mod pool;

pub use config::WorkerConfig;
pub use executor::{ExecutorError, JobOutcome, TaskExecutor};
pub use pool::WorkerPool;
