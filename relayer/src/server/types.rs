use alloy::primitives::{Address, B256};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::JobRouteError;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::types::JobStatus;

/// Job identifier taken from the request path
#[derive(Deserialize)]
pub struct JobId {
    pub id: String,
}

/// Error body shared by every route
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn error(message: String) -> Self {
        Self { success: false, message: Some(message) }
    }
}

pub type JobRouteResult = Result<Response, JobRouteError>;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EnqueueResponse {
    pub id: Uuid,
}

/// Public view of a job
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobItem> for JobStatusResponse {
    fn from(job: JobItem) -> Self {
        Self { status: job.status, tx_hash: job.tx_hash, confirmations: job.confirmations, error: job.failure_reason }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayerStatusResponse {
    pub reward_account: Address,
    pub service_fee: String,
    pub mining_service_fee: String,
    /// wei, absent when the price cache cannot be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price_minimum: Option<String>,
    pub current_queue: u64,
    pub version: String,
}
