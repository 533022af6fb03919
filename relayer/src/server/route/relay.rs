use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{error, info};

use super::super::error::JobRouteError;
use super::super::types::{EnqueueResponse, JobRouteResult};
use crate::config::Config;
use crate::types::jobs::job_item::JobRequest;
use crate::types::jobs::payload::RelayJob;
use crate::types::jobs::types::JobKind;

/// Checks the payload shape and stores the job for the worker
async fn enqueue(kind: JobKind, payload: Value, config: Arc<Config>) -> JobRouteResult {
    RelayJob::from_parts(kind, payload.clone()).map_err(|e| JobRouteError::InvalidPayload(e.to_string()))?;

    match config.queue().enqueue(JobRequest { job_type: kind.to_string(), payload }).await {
        Ok(job) => {
            info!(job_id = %job.id, job_type = %kind, "Job enqueued");
            Ok(Json(EnqueueResponse { id: job.id }).into_response())
        }
        Err(e) => {
            error!(job_type = %kind, error = %e, "Failed to enqueue job");
            Err(JobRouteError::DatabaseError)
        }
    }
}

async fn handle_relay_request(State(config): State<Arc<Config>>, Json(payload): Json<Value>) -> JobRouteResult {
    enqueue(JobKind::Relay, payload, config).await
}

async fn handle_pool_withdraw_request(State(config): State<Arc<Config>>, Json(payload): Json<Value>) -> JobRouteResult {
    enqueue(JobKind::PoolWithdraw, payload, config).await
}

async fn handle_withdraw_v2_request(State(config): State<Arc<Config>>, Json(payload): Json<Value>) -> JobRouteResult {
    enqueue(JobKind::WithdrawV2, payload, config).await
}

async fn handle_mining_reward_request(State(config): State<Arc<Config>>, Json(payload): Json<Value>) -> JobRouteResult {
    enqueue(JobKind::MiningReward, payload, config).await
}

async fn handle_mining_withdraw_request(
    State(config): State<Arc<Config>>,
    Json(payload): Json<Value>,
) -> JobRouteResult {
    enqueue(JobKind::MiningWithdraw, payload, config).await
}

async fn handle_batch_reward_request(State(config): State<Arc<Config>>, Json(payload): Json<Value>) -> JobRouteResult {
    enqueue(JobKind::BatchReward, payload, config).await
}

pub fn relay_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/relay", post(handle_relay_request))
        .route("/v1/poolWithdraw", post(handle_pool_withdraw_request))
        .route("/v1/miningReward", post(handle_mining_reward_request))
        .route("/v1/miningWithdraw", post(handle_mining_withdraw_request))
        .route("/v1/batchReward", post(handle_batch_reward_request))
        .route("/v2/withdraw", post(handle_withdraw_v2_request))
        .with_state(config)
}
