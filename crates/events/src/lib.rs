//! Crunch job dispatch and lifecycle events.
//!
//! - [`JobQueue`]: broker handoff that delivers each submitted job to
//!   exactly one worker context.
//! - [`EventBus`]: in-process publish/subscribe hub for [`JobEvent`]s,
//!   backed by `tokio::sync::broadcast`.

pub mod bus;
pub mod queue;

pub use bus::{EventBus, JobEvent};
pub use queue::{JobDispatch, JobQueue, JobReceiver, QueueError};
