//! Route definitions for read-only diagnostics.

use axum::routing::get;
use axum::Router;

use crate::handlers::debug;
use crate::state::AppState;

/// Routes mounted at `/debug`.
///
/// ```text
/// GET    /jobs            -> list_jobs
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/jobs", get(debug::list_jobs))
}
