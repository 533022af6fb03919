use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::collections::{HashMap, VecDeque};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{JobQueue, QueueError};
use crate::types::jobs::job_item::{JobItem, JobRequest};
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::types::JobStatus;

#[derive(Default)]
struct Inner {
    pending: VecDeque<Uuid>,
    jobs: HashMap<Uuid, JobItem>,
}

/// Process-local queue. Jobs do not survive a restart.
#[derive(Default)]
pub struct InMemoryJobQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, request: JobRequest) -> Result<JobItem, QueueError> {
        let job = JobItem::new(request);
        {
            let mut inner = self.inner.lock().await;
            inner.pending.push_back(job.id);
            inner.jobs.insert(job.id, job.clone());
        }
        self.notify.notify_one();
        debug!(job_id = %job.id, "Job enqueued in memory");
        Ok(job)
    }

    async fn dequeue(&self) -> Result<JobItem, QueueError> {
        loop {
            {
                let mut inner = self.inner.lock().await;
                if let Some(id) = inner.pending.pop_front() {
                    return inner.jobs.get(&id).cloned().ok_or(QueueError::JobNotFound(id));
                }
            }
            self.notify.notified().await;
        }
    }

    async fn update_job(&self, current_job: &JobItem, update: JobItemUpdates) -> Result<JobItem, QueueError> {
        if update == JobItemUpdates::default() {
            return Err(QueueError::NoUpdateFound("No field to be updated, likely a false call".to_string()));
        }
        let mut inner = self.inner.lock().await;
        let stored = inner.jobs.get_mut(&current_job.id).ok_or(QueueError::JobNotFound(current_job.id))?;
        if stored.version != current_job.version {
            warn!(version = %current_job.version, "Failed to update job. Job version is likely outdated");
            return Err(QueueError::UpdateFailed(format!(
                "Failed to update job. Identifier - {}, ",
                current_job.id
            )));
        }
        update.apply(stored);
        stored.version += 1;
        stored.updated_at = Utc::now().round_subsecs(0);
        Ok(stored.clone())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobItem>, QueueError> {
        Ok(self.inner.lock().await.jobs.get(&id).cloned())
    }

    async fn queued_count(&self) -> Result<u64, QueueError> {
        Ok(self.inner.lock().await.pending.len() as u64)
    }

    async fn fail_interrupted(&self, reason: &str) -> Result<u64, QueueError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now().round_subsecs(0);
        let mut failed = 0;
        for job in inner.jobs.values_mut().filter(|job| job.status.is_in_flight()) {
            job.status = JobStatus::Failed;
            job.failure_reason = Some(reason.to_string());
            job.version += 1;
            job.updated_at = now;
            failed += 1;
        }
        Ok(failed)
    }
}
