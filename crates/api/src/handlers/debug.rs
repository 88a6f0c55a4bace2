//! Handlers for the `/debug` diagnostics resource.
//!
//! Read-only views over the status store; nothing here mutates job state.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use crunch_core::job::{JobStatus, JOB_KEY_PREFIX};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Every live job record, keyed by store key.
#[derive(Debug, Serialize)]
pub struct JobListing {
    pub count: usize,
    pub records: BTreeMap<String, JobStatus>,
}

/// GET /api/v1/debug/jobs
///
/// List all live records under the `job:` namespace.
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let records = live_jobs(&state).await?;
    Ok(Json(DataResponse {
        data: JobListing {
            count: records.len(),
            records,
        },
    }))
}

pub(crate) async fn live_jobs(state: &AppState) -> AppResult<BTreeMap<String, JobStatus>> {
    Ok(state.store.list(JOB_KEY_PREFIX).await?)
}
