use alloy::primitives::B256;
use thiserror::Error;
use uuid::Uuid;

use crate::core::client::prover::ProverError;
use crate::core::client::queue::QueueError;
use crate::core::client::transaction::TransactionError;
use crate::core::client::tree::TreeStoreError;
use crate::error::fee::FeeError;
use crate::types::tree::TreeError;

pub type JobResult<T> = Result<T, JobError>;

/// Error types for job processing. The display text of each variant is what
/// ends up in the `failure_reason` of a failed job.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("Invalid payload for {job_type} job: {source}")]
    InvalidPayload {
        job_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fee rejections are surfaced verbatim to the status endpoint
    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error("Tree update retry limit exceeded")]
    TreeUpdateRetryLimitExceeded,

    #[error("Submitted transaction failed")]
    SubmittedTransactionFailed,

    #[error("Revert by smart contract {0}")]
    RevertedByContract(String),

    /// The transaction was broadcast but its receipt could not be obtained
    #[error("Lost track of transaction {tx_hash}, it may still be mined: {reason}")]
    ReceiptUnavailable { tx_hash: B256, reason: String },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Tree store error: {0}")]
    TreeStore(#[from] TreeStoreError),

    #[error("Tree snapshot error: {0}")]
    Tree(#[from] TreeError),

    #[error("Prover error: {0}")]
    Prover(#[from] ProverError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Indicates the job was not registered as the active job of the worker
    #[error("Job {id} is not the active job")]
    NotActive { id: Uuid },

    #[error("Other error: {0}")]
    Other(String),
}
