use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::client::transaction::TxCall;
use crate::core::client::{JobQueue, PendingTransaction};
use crate::error::job::{JobError, JobResult};
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::payload::RelayJob;
use crate::types::tree::TreeSnapshot;

/// The job currently owned by the worker
pub struct ActiveJob {
    /// latest persisted version of the job record
    pub item: JobItem,
    pub job: RelayJob,
    /// broadcast in flight for the job, if any
    pub pending: Option<Arc<dyn PendingTransaction>>,
    /// call carried by the latest broadcast
    pub call: Option<TxCall>,
}

impl ActiveJob {
    pub fn new(item: JobItem, job: RelayJob) -> Self {
        Self { item, job, pending: None, call: None }
    }

    /// Writes `updates` to the queue and keeps the returned version
    pub async fn persist(&mut self, queue: &dyn JobQueue, updates: JobItemUpdates) -> JobResult<()> {
        let updates = updates.build()?;
        self.item = queue.update_job(&self.item, updates).await?;
        Ok(())
    }
}

/// Everything the processor and the tree synchronizer share. Guarded by a single
/// mutex so that at most one of them touches the pending transaction at a time.
#[derive(Default)]
pub struct WorkerState {
    pub active: Option<ActiveJob>,
    pub tree: Option<Arc<TreeSnapshot>>,
}

impl WorkerState {
    pub fn active_mut(&mut self, id: Uuid) -> JobResult<&mut ActiveJob> {
        match self.active.as_mut() {
            Some(active) if active.item.id == id => Ok(active),
            _ => Err(JobError::NotActive { id }),
        }
    }
}

pub type SharedWorkerState = Arc<Mutex<WorkerState>>;
