use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::call::build_call;
use super::state::{ActiveJob, SharedWorkerState};
use super::synchronizer::TreeSynchronizer;
use crate::config::Config;
use crate::core::client::transaction::{TxCall, TxReceipt};
use crate::core::client::PendingTransaction;
use crate::error::job::{JobError, JobResult};
use crate::types::constant::{
    MAX_CONFIRMATION_ATTEMPTS, MAX_POST_RECEIPT_RETRIES, MAX_PRE_RECEIPT_RETRIES, MAX_RECEIPT_WAITS,
};
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::payload::RelayJob;
use crate::types::jobs::types::JobStatus;

/// Drives one job at a time from `QUEUED` to `CONFIRMED` or `FAILED`
pub struct JobProcessor {
    config: Arc<Config>,
    state: SharedWorkerState,
    synchronizer: Arc<TreeSynchronizer>,
}

impl JobProcessor {
    pub fn new(config: Arc<Config>, state: SharedWorkerState, synchronizer: Arc<TreeSynchronizer>) -> Self {
        Self { config, state, synchronizer }
    }

    /// Dequeues and processes jobs until `cancel` fires. Cancellation is only
    /// observed between jobs.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Job processor started");
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.config.queue().dequeue() => next,
            };
            match next {
                Ok(item) => self.process(item).await,
                Err(e) => {
                    error!(error = %e, "Failed to dequeue job");
                    sleep(self.config.service_params().queue_poll_interval).await;
                }
            }
        }
        info!("Job processor stopped");
    }

    /// Runs a dequeued job to a terminal state. Errors never escape: they are
    /// recorded on the job as `FAILED`.
    pub async fn process(&self, item: JobItem) {
        let span = info_span!("job_processing", job_id = %item.id, job_type = %item.request.job_type);
        self.process_job(item).instrument(span).await
    }

    async fn process_job(&self, item: JobItem) {
        let job = match RelayJob::try_from(&item.request) {
            Ok(job) => job,
            Err(e) => return self.reject(item, e).await,
        };

        let id = item.id;
        self.state.lock().await.active = Some(ActiveJob::new(item, job.clone()));

        let result = self.execute(id, &job).await;

        let mut state = self.state.lock().await;
        if let Err(e) = result {
            if let Ok(active) = state.active_mut(id) {
                let updates =
                    JobItemUpdates::new().update_status(JobStatus::Failed).update_failure_reason(e.to_string());
                if let Err(persist_error) = active.persist(self.config.queue(), updates).await {
                    error!(error = %persist_error, "Failed to record job failure");
                }
            }
            error!(log_type = "completed", category = "job", function_type = "process", error = %e, "Job failed");
        } else {
            info!(log_type = "completed", category = "job", function_type = "process", "Job confirmed");
        }
        state.active = None;
    }

    /// Records a job that could not be decoded as `FAILED`
    async fn reject(&self, item: JobItem, error: JobError) {
        let updates = JobItemUpdates::new().update_status(JobStatus::Failed).update_failure_reason(error.to_string());
        match updates.build() {
            Ok(updates) => {
                if let Err(e) = self.config.queue().update_job(&item, updates).await {
                    error!(error = %e, "Failed to record job rejection");
                }
            }
            Err(e) => error!(error = %e, "Failed to build job rejection"),
        }
        error!(error = %error, "Job rejected");
    }

    async fn execute(&self, id: Uuid, job: &RelayJob) -> JobResult<()> {
        info!(log_type = "starting", category = "job", function_type = "process", "Processing job.");
        self.persist(id, JobItemUpdates::new().update_status(JobStatus::Accepted)).await?;

        self.config.fee_policy().check(job, self.config.price_cache(), self.config.pool()).await?;
        debug!("Fee check passed");

        let tree_dependent = job.is_tree_dependent();
        let mut retry: u32 = 0;
        loop {
            let receipt = match self.submit(id, job).await {
                Ok(pending) => self.wait_for_receipt(pending.as_ref()).await,
                Err(e) => Err(e),
            };

            match receipt {
                Ok(receipt) => {
                    let call = self.record_receipt(id, &receipt).await?;
                    if receipt.success {
                        self.track_confirmations(id, receipt.block_number).await?;
                        self.persist(id, JobItemUpdates::new().update_status(JobStatus::Confirmed)).await?;
                        return Ok(());
                    }
                    if !(tree_dependent && self.reverted_on_stale_root(call, receipt.block_number).await) {
                        return Err(JobError::SubmittedTransactionFailed);
                    }
                    if retry >= MAX_POST_RECEIPT_RETRIES {
                        return Err(JobError::TreeUpdateRetryLimitExceeded);
                    }
                    retry += 1;
                    warn!(
                        retry = retry,
                        tx_hash = %receipt.tx_hash,
                        "Transaction reverted on a stale root, resubmitting"
                    );
                    self.persist(id, JobItemUpdates::new().update_status(JobStatus::Resubmitted)).await?;
                }
                Err(JobError::Transaction(e)) => {
                    if !(tree_dependent && e.is_stale_root()) {
                        return Err(JobError::RevertedByContract(e.to_string()));
                    }
                    if retry >= MAX_PRE_RECEIPT_RETRIES {
                        return Err(JobError::TreeUpdateRetryLimitExceeded);
                    }
                    retry += 1;
                    warn!(retry = retry, error = %e, "Transaction rejected on a stale root, retrying");
                    sleep(self.config.service_params().stale_root_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Builds, refreshes and broadcasts the job's call. The state lock is held
    /// throughout so the synchronizer never sees a broadcast without its handle.
    async fn submit(&self, id: Uuid, job: &RelayJob) -> JobResult<Arc<dyn PendingTransaction>> {
        let mut call = build_call(job, self.config.chain_params(), None);

        let mut state = self.state.lock().await;
        if job.is_tree_dependent() {
            call = self.synchronizer.refresh_before_send(&mut state, job, call).await?;
        }

        let pending = self.config.transaction_manager().submit(call.clone()).await?;
        let tx_hash = pending.tx_hash().await;

        let active = state.active_mut(id)?;
        active.pending = Some(pending.clone());
        active.call = Some(call);
        active
            .persist(self.config.queue(), JobItemUpdates::new().update_status(JobStatus::Sent).update_tx_hash(tx_hash))
            .await?;
        info!(tx_hash = %tx_hash, nonce = pending.nonce(), "Transaction sent");
        Ok(pending)
    }

    /// A failed wait leaves the outcome of the broadcast unknown. It is waited on
    /// again and, once out of attempts, reported without claiming a revert.
    async fn wait_for_receipt(&self, pending: &dyn PendingTransaction) -> JobResult<TxReceipt> {
        let mut waits: u32 = 0;
        loop {
            match pending.await_receipt().await {
                Ok(receipt) => return Ok(receipt),
                Err(e) if waits < MAX_RECEIPT_WAITS => {
                    waits += 1;
                    warn!(waits = waits, error = %e, "Receipt wait failed, waiting again");
                    sleep(self.config.chain_params().receipt_poll_interval).await;
                }
                Err(e) => {
                    let tx_hash = pending.tx_hash().await;
                    return Err(JobError::ReceiptUnavailable { tx_hash, reason: e.to_string() });
                }
            }
        }
    }

    /// Persists `MINED` and hands back the call of the mined broadcast
    async fn record_receipt(&self, id: Uuid, receipt: &TxReceipt) -> JobResult<Option<TxCall>> {
        let mut state = self.state.lock().await;
        let active = state.active_mut(id)?;
        active.pending = None;
        active
            .persist(
                self.config.queue(),
                JobItemUpdates::new().update_status(JobStatus::Mined).update_tx_hash(receipt.tx_hash),
            )
            .await?;
        info!(
            tx_hash = %receipt.tx_hash,
            block_number = receipt.block_number,
            success = receipt.success,
            "Transaction mined"
        );
        Ok(active.call.take())
    }

    /// Replays the reverted call at its block to see whether the revert came from an outdated root
    async fn reverted_on_stale_root(&self, call: Option<TxCall>, block_number: u64) -> bool {
        let Some(call) = call else {
            return false;
        };
        match self.config.transaction_manager().simulate(call, block_number).await {
            Ok(()) => false,
            Err(e) => {
                debug!(error = %e, "Simulated revert reason");
                e.is_stale_root()
            }
        }
    }

    /// Records the confirmation count until the configured depth is reached.
    /// Advisory only, a failing read ends tracking without failing the job.
    async fn track_confirmations(&self, id: Uuid, block_number: u64) -> JobResult<()> {
        let required = self.config.service_params().required_confirmations;
        let mut recorded = None;
        for _ in 0..MAX_CONFIRMATION_ATTEMPTS {
            let confirmations = match self.config.transaction_manager().confirmations(block_number).await {
                Ok(confirmations) => confirmations,
                Err(e) => {
                    warn!(error = %e, "Failed to read confirmations");
                    break;
                }
            };
            if recorded != Some(confirmations) {
                self.persist(id, JobItemUpdates::new().update_confirmations(confirmations)).await?;
                recorded = Some(confirmations);
            }
            if confirmations >= required {
                break;
            }
            sleep(self.config.chain_params().receipt_poll_interval).await;
        }
        Ok(())
    }

    async fn persist(&self, id: Uuid, updates: JobItemUpdates) -> JobResult<()> {
        let mut state = self.state.lock().await;
        state.active_mut(id)?.persist(self.config.queue(), updates).await
    }
}
