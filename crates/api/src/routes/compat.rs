//! Root-level job routes for clients that predate `/api/v1`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::compat;
use crate::state::AppState;

/// Routes merged at the root.
///
/// ```text
/// POST   /jobs            -> submit_job
/// GET    /jobs/{id}       -> get_job
/// GET    /debug/jobs      -> list_jobs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(compat::submit_job))
        .route("/jobs/{id}", get(compat::get_job))
        .route("/debug/jobs", get(compat::list_jobs))
}
