use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::call::build_call;
use super::state::{ActiveJob, SharedWorkerState, WorkerState};
use crate::config::Config;
use crate::core::client::transaction::TxCall;
use crate::error::job::JobResult;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::payload::RelayJob;
use crate::types::tree::TreeSnapshot;

/// Keeps the worker's view of the account tree current and re-anchors the
/// in-flight mining transaction whenever the tree advances under it.
pub struct TreeSynchronizer {
    config: Arc<Config>,
    state: SharedWorkerState,
}

impl TreeSynchronizer {
    pub fn new(config: Arc<Config>, state: SharedWorkerState) -> Self {
        Self { config, state }
    }

    pub async fn load_snapshot(&self) -> JobResult<Arc<TreeSnapshot>> {
        let serialized = self.config.tree_store().get().await?;
        let snapshot = TreeSnapshot::deserialize(&serialized)?;
        debug!(root = %snapshot.root_bytes(), leaves = snapshot.leaves().len(), "Tree snapshot loaded");
        Ok(Arc::new(snapshot))
    }

    /// Loads the initial snapshot
    pub async fn prime(&self) -> JobResult<()> {
        let snapshot = self.load_snapshot().await?;
        self.state.lock().await.tree = Some(snapshot);
        Ok(())
    }

    /// Refreshes the snapshot right before a tree-dependent job is broadcast and
    /// returns the call to send, re-anchored if the job's root is already stale.
    /// The caller holds the worker state lock.
    pub async fn refresh_before_send(
        &self,
        state: &mut WorkerState,
        job: &RelayJob,
        call: TxCall,
    ) -> JobResult<TxCall> {
        let snapshot = self.load_snapshot().await?;
        state.tree = Some(snapshot.clone());
        Ok(self.regenerate_call(job, &snapshot).await?.unwrap_or(call))
    }

    /// Builds a call carrying a tree update onto `snapshot`, or `None` when the
    /// job's proof is still anchored at the current root.
    pub async fn regenerate_call(&self, job: &RelayJob, snapshot: &TreeSnapshot) -> JobResult<Option<TxCall>> {
        let Some(account) = job.account() else {
            return Ok(None);
        };
        if snapshot.is_current(&account.input_root) {
            debug!("Account root is up to date");
            return Ok(None);
        }

        info!(
            input_root = %account.input_root,
            current_root = %snapshot.root_bytes(),
            "Account root is outdated, generating tree update"
        );
        let update = self.config.prover().generate_tree_update(account.output_commitment, snapshot).await?;
        Ok(Some(build_call(job, self.config.chain_params(), Some(&update))))
    }

    /// Handles one "tree advanced" signal. Failures are logged, the in-flight job
    /// then fails on its own if its transaction reverts.
    pub async fn on_tree_advanced(&self) {
        if let Err(e) = self.reconcile().await {
            error!(error = %e, "Failed to reconcile the active job with the new tree");
        }
    }

    async fn reconcile(&self) -> JobResult<()> {
        let snapshot = self.load_snapshot().await?;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.tree.as_ref().is_some_and(|tree| tree.root() == snapshot.root()) {
            debug!("Tree root unchanged");
            return Ok(());
        }

        // The worker's tree only moves once the in-flight call is anchored on it,
        // a failed re-anchor is attempted again on the next signal
        if let Some(active) = state.active.as_mut() {
            self.reanchor(active, &snapshot).await?;
        }
        state.tree = Some(snapshot);
        Ok(())
    }

    /// Replaces the broadcast of `active` with a call carrying a tree update onto `snapshot`
    async fn reanchor(&self, active: &mut ActiveJob, snapshot: &TreeSnapshot) -> JobResult<()> {
        let Some(pending) = active.pending.clone() else {
            return Ok(());
        };
        let Some(call) = self.regenerate_call(&active.job, snapshot).await? else {
            return Ok(());
        };

        let tx_hash = pending.replace(call.clone()).await?;
        active.call = Some(call);
        active.persist(self.config.queue(), JobItemUpdates::new().update_tx_hash(tx_hash)).await?;
        info!(
            job_id = %active.item.id,
            tx_hash = %tx_hash,
            nonce = pending.nonce(),
            "Pending transaction replaced with a tree update"
        );
        Ok(())
    }

    /// Subscribes again after a backoff until it succeeds. `None` when cancelled.
    async fn resubscribe(&self, cancel: &CancellationToken) -> Option<BoxStream<'static, ()>> {
        let backoff = self.config.service_params().tree_resubscribe_backoff;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = sleep(backoff) => {}
            }
            match self.config.tree_store().subscribe().await {
                Ok(stream) => {
                    info!("Resubscribed to tree updates");
                    return Some(stream);
                }
                Err(e) => warn!(error = %e, "Failed to resubscribe to tree updates"),
            }
        }
    }

    /// Subscribes to tree updates and spawns the listener and handler tasks.
    /// Bursts of notifications collapse into a single pending signal.
    pub async fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JobResult<Vec<JoinHandle<()>>> {
        let mut updates = self.config.tree_store().subscribe().await?;
        let (sender, mut receiver) = mpsc::channel::<()>(1);

        let listener_cancel = cancel.clone();
        let listener_synchronizer = self.clone();
        let listener = tokio::spawn(async move {
            loop {
                let update = tokio::select! {
                    _ = listener_cancel.cancelled() => break,
                    update = updates.next() => update,
                };
                if update.is_none() {
                    warn!("Tree update subscription closed, resubscribing");
                    match listener_synchronizer.resubscribe(&listener_cancel).await {
                        Some(stream) => updates = stream,
                        None => break,
                    }
                }
                // after a resubscribe this also covers updates missed in between
                match sender.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
            debug!("Tree update listener stopped");
        });

        let handler = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    signal = receiver.recv() => match signal {
                        Some(()) => self.on_tree_advanced().await,
                        None => break,
                    }
                }
            }
            debug!("Tree synchronizer stopped");
        });

        Ok(vec![listener, handler])
    }
}
