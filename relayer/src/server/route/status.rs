use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, warn};

use super::super::error::JobRouteError;
use super::super::types::{JobRouteResult, RelayerStatusResponse};
use crate::config::Config;

const INDEX: &str = "This is the relayer service. Check /v1/status for settings";

async fn handle_status_request(State(config): State<Arc<Config>>) -> JobRouteResult {
    let fee_params = config.fee_policy().params();

    let gas_price_minimum = match config.price_cache().gas_price_minimum().await {
        Ok(price) => Some(price.to_string()),
        Err(e) => {
            warn!(error = %e, "Gas price is not available");
            None
        }
    };
    let current_queue = config.queue().queued_count().await.map_err(|e| {
        error!(error = %e, "Failed to count queued jobs");
        JobRouteError::DatabaseError
    })?;

    Ok(Json(RelayerStatusResponse {
        reward_account: fee_params.reward_account,
        service_fee: fee_params.service_fee.clone(),
        mining_service_fee: fee_params.mining_service_fee.clone(),
        gas_price_minimum,
        current_queue,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
    .into_response())
}

async fn index_handler() -> &'static str {
    INDEX
}

pub fn status_router(config: Arc<Config>) -> Router {
    Router::new().route("/", get(index_handler)).route("/v1/status", get(handle_status_request)).with_state(config)
}
