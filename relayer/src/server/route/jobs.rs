use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::super::error::JobRouteError;
use super::super::types::{JobId, JobRouteResult, JobStatusResponse};
use crate::config::Config;

/// Returns the status of a job.
///
/// # Errors
/// * `JobRouteError::InvalidId` - If the provided ID is not a valid UUID
/// * `JobRouteError::NotFound` - If no job has this ID
#[instrument(skip(config), fields(job_id = %id))]
async fn handle_get_job_request(Path(JobId { id }): Path<JobId>, State(config): State<Arc<Config>>) -> JobRouteResult {
    let job_id = Uuid::parse_str(&id).map_err(|_| JobRouteError::InvalidId(id.clone()))?;

    match config.queue().get_job(job_id).await {
        Ok(Some(job)) => {
            debug!(status = %job.status, "Job status fetched");
            Ok(Json(JobStatusResponse::from(job)).into_response())
        }
        Ok(None) => Err(JobRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch job");
            Err(JobRouteError::DatabaseError)
        }
    }
}

pub fn job_router(config: Arc<Config>) -> Router {
    Router::new().route("/:id", get(handle_get_job_request)).with_state(config)
}
