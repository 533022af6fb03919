pub mod error;
pub mod memory;
pub mod mongodb;

use async_trait::async_trait;
pub use error::QueueError;
use uuid::Uuid;

use crate::types::jobs::job_item::{JobItem, JobRequest};
use crate::types::jobs::job_updates::JobItemUpdates;

/// Durable FIFO of relay jobs. The worker is its only consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// enqueue - Store a new job in `QUEUED` state
    async fn enqueue(&self, request: JobRequest) -> Result<JobItem, QueueError>;
    /// dequeue - Claim the oldest queued job, waiting until one exists
    async fn dequeue(&self) -> Result<JobItem, QueueError>;
    /// update_job - Apply `update` to `current_job`, failing if the stored version moved on
    async fn update_job(&self, current_job: &JobItem, update: JobItemUpdates) -> Result<JobItem, QueueError>;
    /// get_job - Get a job by its ID
    async fn get_job(&self, id: Uuid) -> Result<Option<JobItem>, QueueError>;
    /// queued_count - Number of jobs still waiting for the worker
    async fn queued_count(&self) -> Result<u64, QueueError>;
    /// fail_interrupted - Mark jobs left in flight by a previous worker as `FAILED` with `reason`
    /// and release claimed jobs that were never accepted. Returns the number of failed jobs.
    async fn fail_interrupted(&self, reason: &str) -> Result<u64, QueueError>;
}
