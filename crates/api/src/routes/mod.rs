pub mod compat;
pub mod debug;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /jobs                 submit (POST)
/// /jobs/{id}            status (GET)
/// /debug/jobs           live job records (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/jobs", jobs::router())
        .nest("/debug", debug::router())
}
