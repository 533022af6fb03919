pub mod call;
pub mod processor;
pub mod state;
pub mod synchronizer;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::types::constant::INTERRUPTED_JOB_REASON;
use crate::{RelayerError, RelayerResult};
use processor::JobProcessor;
use state::WorkerState;
use synchronizer::TreeSynchronizer;

/// Handles of the worker tasks
pub struct WorkerController {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerController {
    /// Stops dequeuing, lets the current job finish and waits for every task
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown of the worker");
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task panicked");
            }
        }
        info!("Worker shutdown complete");
    }
}

/// Starts the tree synchronizer and the single job processor
pub async fn initialize_worker(config: Arc<Config>) -> RelayerResult<WorkerController> {
    // Jobs the previous worker left in flight have no owner anymore
    match config.queue().fail_interrupted(INTERRUPTED_JOB_REASON).await {
        Ok(0) => {}
        Ok(count) => warn!(count, "Failed jobs interrupted by a restart"),
        Err(e) => return Err(RelayerError::WorkerError(format!("Failed to recover interrupted jobs: {e}"))),
    }

    let state = Arc::new(Mutex::new(WorkerState::default()));
    let synchronizer = Arc::new(TreeSynchronizer::new(config.clone(), state.clone()));

    // A missing snapshot is not fatal, every tree-dependent job refreshes before sending
    if let Err(e) = synchronizer.prime().await {
        warn!(error = %e, "Failed to load the initial tree snapshot");
    }

    let cancel = CancellationToken::new();
    let mut handles = synchronizer
        .clone()
        .spawn(cancel.clone())
        .await
        .map_err(|e| RelayerError::WorkerError(format!("Failed to start tree synchronizer: {e}")))?;

    let processor = JobProcessor::new(config, state, synchronizer);
    let processor_cancel = cancel.clone();
    handles.push(tokio::spawn(async move { processor.run(processor_cancel).await }));

    info!("Worker started");
    Ok(WorkerController { cancel, handles })
}
