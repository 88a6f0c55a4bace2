//! Request handlers.
//!
//! Handlers read and write job status through the shared status store and
//! map errors via [`AppError`](crate::error::AppError).

pub mod compat;
pub mod debug;
pub mod jobs;
