use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::B256;
use assert_matches::assert_matches;
use rstest::*;

use crate::core::client::queue::memory::InMemoryJobQueue;
use crate::core::client::queue::QueueError;
use crate::core::client::JobQueue;
use crate::types::jobs::job_item::JobRequest;
use crate::types::constant::INTERRUPTED_JOB_REASON;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::types::JobStatus;

fn request(index: usize) -> JobRequest {
    JobRequest { job_type: "RELAY".to_string(), payload: serde_json::json!({ "index": index }) }
}

#[rstest]
#[tokio::test]
async fn dequeue_is_fifo() {
    let queue = InMemoryJobQueue::new();
    let mut ids = vec![];
    for index in 0..3 {
        ids.push(queue.enqueue(request(index)).await.unwrap().id);
    }
    assert_eq!(queue.queued_count().await.unwrap(), 3);

    for id in ids {
        let job = queue.dequeue().await.unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status, JobStatus::Queued);
    }
    assert_eq!(queue.queued_count().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn dequeue_waits_for_a_job() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let consumer = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.dequeue().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!consumer.is_finished());

    let job = queue.enqueue(request(0)).await.unwrap();
    let dequeued = tokio::time::timeout(Duration::from_secs(5), consumer).await.unwrap().unwrap().unwrap();
    assert_eq!(dequeued.id, job.id);
}

#[rstest]
#[tokio::test]
async fn update_bumps_the_version() {
    let queue = InMemoryJobQueue::new();
    let job = queue.enqueue(request(0)).await.unwrap();

    let tx_hash = B256::repeat_byte(0x01);
    let updated = queue
        .update_job(&job, JobItemUpdates::new().update_status(JobStatus::Sent).update_tx_hash(tx_hash))
        .await
        .unwrap();

    assert_eq!(updated.version, job.version + 1);
    assert_eq!(updated.status, JobStatus::Sent);
    assert_eq!(updated.tx_hash, Some(tx_hash));
    assert_eq!(updated.created_at, job.created_at);
    assert_eq!(queue.get_job(job.id).await.unwrap(), Some(updated));
}

#[rstest]
#[tokio::test]
async fn outdated_version_is_refused() {
    let queue = InMemoryJobQueue::new();
    let job = queue.enqueue(request(0)).await.unwrap();
    queue.update_job(&job, JobItemUpdates::new().update_status(JobStatus::Accepted)).await.unwrap();

    let result = queue.update_job(&job, JobItemUpdates::new().update_status(JobStatus::Failed)).await;

    assert_matches!(result, Err(QueueError::UpdateFailed(_)));
    assert_eq!(queue.get_job(job.id).await.unwrap().unwrap().status, JobStatus::Accepted);
}

#[rstest]
#[tokio::test]
async fn empty_update_is_refused() {
    let queue = InMemoryJobQueue::new();
    let job = queue.enqueue(request(0)).await.unwrap();
    assert_matches!(queue.update_job(&job, JobItemUpdates::new()).await, Err(QueueError::NoUpdateFound(_)));
}

#[rstest]
#[tokio::test]
async fn unknown_job_is_none() {
    let queue = InMemoryJobQueue::new();
    assert_eq!(queue.get_job(uuid::Uuid::new_v4()).await.unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn interrupted_jobs_are_failed_on_recovery() {
    let queue = InMemoryJobQueue::new();
    let sent = queue.enqueue(request(0)).await.unwrap();
    let confirmed = queue.enqueue(request(1)).await.unwrap();
    let waiting = queue.enqueue(request(2)).await.unwrap();

    assert_eq!(queue.dequeue().await.unwrap().id, sent.id);
    assert_eq!(queue.dequeue().await.unwrap().id, confirmed.id);
    let tx_hash = B256::repeat_byte(0x02);
    let sent = queue
        .update_job(&sent, JobItemUpdates::new().update_status(JobStatus::Sent).update_tx_hash(tx_hash))
        .await
        .unwrap();
    queue.update_job(&confirmed, JobItemUpdates::new().update_status(JobStatus::Confirmed)).await.unwrap();

    assert_eq!(queue.fail_interrupted(INTERRUPTED_JOB_REASON).await.unwrap(), 1);

    let recovered = queue.get_job(sent.id).await.unwrap().unwrap();
    assert_eq!(recovered.status, JobStatus::Failed);
    assert_eq!(recovered.failure_reason.as_deref(), Some(INTERRUPTED_JOB_REASON));
    assert_eq!(recovered.tx_hash, Some(tx_hash));
    assert_eq!(recovered.version, sent.version + 1);

    assert_eq!(queue.get_job(confirmed.id).await.unwrap().unwrap().status, JobStatus::Confirmed);
    assert_eq!(queue.dequeue().await.unwrap().id, waiting.id);
}

#[rstest]
#[tokio::test]
async fn recovery_without_interrupted_jobs_changes_nothing() {
    let queue = InMemoryJobQueue::new();
    let job = queue.enqueue(request(0)).await.unwrap();

    assert_eq!(queue.fail_interrupted(INTERRUPTED_JOB_REASON).await.unwrap(), 0);
    assert_eq!(queue.get_job(job.id).await.unwrap(), Some(job));
}
