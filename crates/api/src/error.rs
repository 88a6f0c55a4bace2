use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crunch_core::error::CoreError;
use crunch_events::QueueError;
use crunch_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `crunch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The status store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The job queue refused a dispatch.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// A request body that could not be read as JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Infrastructure errors ---
            AppError::Store(err) => classify_store_error(err),
            AppError::Queue(err) => {
                tracing::error!(error = %err, "Job queue error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "QUEUE_UNAVAILABLE",
                    "Job queue is not accepting work".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a status store error into an HTTP status, error code, and message.
///
/// - `Unavailable` maps to 503.
/// - A malformed record maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Unavailable(detail) => {
            tracing::error!(error = %detail, "Status store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Status store is unavailable".to_string(),
            )
        }
        StoreError::Serialization(detail) => {
            tracing::error!(error = %detail, "Malformed status record");
            internal()
        }
    }
}
