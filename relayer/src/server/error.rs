use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ApiResponse;

pub const JOB_NOT_FOUND_MESSAGE: &str = "The job doesn't exist";

/// Errors of the job routes. Every variant is answered with an `ApiResponse` error body.
///
/// * `InvalidId` - 400 Bad Request
/// * `NotFound` - 400 Bad Request
/// * `InvalidPayload` - 400 Bad Request
/// * `DatabaseError` - 500 Internal Server Error
#[derive(Debug, thiserror::Error)]
pub enum JobRouteError {
    #[error("Invalid job ID: {0}")]
    InvalidId(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    /// The body does not decode into the payload of the requested job type
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Database error")]
    DatabaseError,
}

impl IntoResponse for JobRouteError {
    fn into_response(self) -> Response {
        match self {
            JobRouteError::InvalidId(id) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Invalid job ID: {}", id)))).into_response()
            }
            JobRouteError::NotFound(_) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(JOB_NOT_FOUND_MESSAGE.to_string()))).into_response()
            }
            JobRouteError::InvalidPayload(msg) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg))).into_response()
            }
            JobRouteError::DatabaseError => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error("Database error occurred".to_string())))
                    .into_response()
            }
        }
    }
}
