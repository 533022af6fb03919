use alloy::primitives::B256;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::jobs::types::JobStatus;

/// What the enqueue boundary persists. The type is kept as a raw string so that
/// an unrecognised type can still be stored and then rejected by the worker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub job_type: String,
    pub payload: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobItem {
    /// an uuid to identify a job
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    /// the job type and its type-specific payload
    pub request: JobRequest,
    pub status: JobStatus,
    /// hash of the latest broadcast (or mined) transaction
    pub tx_hash: Option<B256>,
    /// advisory confirmation counter
    pub confirmations: Option<u64>,
    /// reason recorded when the job reaches FAILED
    pub failure_reason: Option<String>,
    /// helps to keep track of the version of the item for optimistic locking
    pub version: i32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl JobItem {
    pub fn new(request: JobRequest) -> Self {
        let now = Utc::now().round_subsecs(0);
        Self {
            id: Uuid::new_v4(),
            request,
            status: JobStatus::Queued,
            tx_hash: None,
            confirmations: None,
            failure_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
