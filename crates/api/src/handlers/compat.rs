//! Root-level job endpoints with unwrapped bodies.
//!
//! Existing clients call `/jobs` and `/debug/jobs` directly and read the
//! status record at the top level of the response, so these handlers share
//! the `/api/v1` logic but skip the `{ "data": ... }` envelope.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use crunch_core::job::JobStatus;
use crunch_core::submission::SubmitJob;
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::{debug, jobs};
use crate::state::AppState;

/// Diagnostics listing in the root-level shape.
#[derive(Debug, Serialize)]
pub struct JobDump {
    pub total_jobs: usize,
    pub jobs: BTreeMap<String, JobStatus>,
}

/// POST /jobs
///
/// Same as `POST /api/v1/jobs` but answers 200 with `{job_id, status}`.
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let created = jobs::create_job(&state, payload).await?;
    Ok(Json(created))
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = jobs::find_job(&state, job_id).await?;
    Ok(Json(record))
}

/// GET /debug/jobs
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs = debug::live_jobs(&state).await?;
    Ok(Json(JobDump {
        total_jobs: jobs.len(),
        jobs,
    }))
}
