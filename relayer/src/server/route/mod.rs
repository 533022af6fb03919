use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;

use crate::config::Config;
use jobs::job_router;
use relay::relay_router;
use status::status_router;

pub(super) mod jobs;
pub(super) mod relay;
pub(super) mod status;

/// Fallback for routes that do not exist
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

pub(crate) fn server_router(config: Arc<Config>) -> Router {
    Router::new()
        .merge(relay_router(config.clone()))
        .merge(status_router(config.clone()))
        .nest("/v1/jobs", job_router(config))
        .fallback(handler_404)
}
