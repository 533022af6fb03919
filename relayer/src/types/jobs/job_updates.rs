use alloy::primitives::B256;
use serde::Serialize;

use crate::error::job::JobError;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::types::JobStatus;

/// Defining a structure that contains the changes to be made in the job object,
/// id, request and created at are not allowed to be changed
// version and updated_at will always be updated when this object updates the job
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct JobItemUpdates {
    pub status: Option<JobStatus>,
    pub tx_hash: Option<B256>,
    pub confirmations: Option<u64>,
    pub failure_reason: Option<String>,
}

impl JobItemUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(mut self, status: JobStatus) -> JobItemUpdates {
        self.status = Some(status);
        self
    }

    pub fn update_tx_hash(mut self, tx_hash: B256) -> JobItemUpdates {
        self.tx_hash = Some(tx_hash);
        self
    }

    pub fn update_confirmations(mut self, confirmations: u64) -> JobItemUpdates {
        self.confirmations = Some(confirmations);
        self
    }

    pub fn update_failure_reason(mut self, reason: String) -> JobItemUpdates {
        self.failure_reason = Some(reason);
        self
    }

    pub fn build(self) -> Result<JobItemUpdates, JobError> {
        if self.status.is_none()
            && self.tx_hash.is_none()
            && self.confirmations.is_none()
            && self.failure_reason.is_none()
        {
            Err(JobError::Other("No field to be updated, likely a false call".to_string()))
        } else {
            Ok(self)
        }
    }

    /// Applies the changes to an in-memory copy of the job
    pub fn apply(&self, job: &mut JobItem) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(tx_hash) = self.tx_hash {
            job.tx_hash = Some(tx_hash);
        }
        if let Some(confirmations) = self.confirmations {
            job.confirmations = Some(confirmations);
        }
        if let Some(reason) = &self.failure_reason {
            job.failure_reason = Some(reason.clone());
        }
    }
}
