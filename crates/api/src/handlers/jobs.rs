//! Handlers for the `/jobs` resource.
//!
//! Submission writes the pending record before handing the job to the
//! queue, so the executor's first write always lands after it. If the queue
//! refuses the job, the pending record is overwritten as failed before the
//! error is returned.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use crunch_core::error::CoreError;
use crunch_core::job::{JobState, JobStatus};
use crunch_core::operation::Operation;
use crunch_core::submission::{JobCreated, SubmitJob};
use crunch_core::types::JobId;
use crunch_events::JobDispatch;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Submit a new computation job. Returns 201 with the job id. The job
/// starts in `pending` status and is picked up by the worker pool.
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let created = create_job(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// Validate, record and enqueue a submission.
pub(crate) async fn create_job(
    state: &AppState,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> AppResult<JobCreated> {
    let Json(input) =
        payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let operation = input.validate()?;
    if !Operation::is_known(&input.operation) {
        tracing::warn!(
            operation = %input.operation,
            "Unknown operation, falling back to double",
        );
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    let dispatch = JobDispatch::new(job_id.clone(), input.numbers, operation);

    let mut record = JobStatus::pending(dispatch.items.len(), Some(dispatch.broker_ref.clone()));
    state.store.put(&job_id, &record, state.status_ttl).await?;

    if let Err(err) = state.queue.send(dispatch) {
        tracing::error!(job_id = %job_id, error = %err, "Job queue refused submission");
        record.fail(err.to_string())?;
        if let Err(store_err) = state.store.put(&job_id, &record, state.status_ttl).await {
            tracing::error!(
                job_id = %job_id,
                error = %store_err,
                "Failed to mark refused job as failed",
            );
        }
        return Err(err.into());
    }

    tracing::info!(
        job_id = %job_id,
        total = record.total,
        operation = %operation,
        queued = state.queue.queued(),
        "Job submitted",
    );

    Ok(JobCreated {
        job_id,
        status: JobState::Pending,
    })
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}
///
/// Current status record of a job. Unknown and expired jobs are 404.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = find_job(&state, job_id).await?;
    Ok(Json(DataResponse { data: record }))
}

pub(crate) async fn find_job(state: &AppState, job_id: JobId) -> AppResult<JobStatus> {
    let record = state.store.get(&job_id).await?;
    let record = record.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Job",
        id: job_id,
    }))?;
    Ok(record)
}
