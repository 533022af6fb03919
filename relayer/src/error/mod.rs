pub mod fee;
pub mod job;

use thiserror::Error;

use crate::core::client::cache::PriceCacheError;
use crate::core::client::pool::PoolError;
use crate::core::client::prover::ProverError;
use crate::core::client::queue::QueueError;
use crate::core::client::transaction::TransactionError;
use crate::core::client::tree::TreeStoreError;
pub use fee::FeeError;
pub use job::{JobError, JobResult};

/// Result type for relayer bootstrap operations
pub type RelayerResult<T> = Result<T, RelayerError>;

/// Errors surfaced while assembling and running the relayer service
#[derive(Error, Debug)]
pub enum RelayerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),

    #[error("Price cache error: {0}")]
    PriceCacheError(#[from] PriceCacheError),

    #[error("Tree store error: {0}")]
    TreeStoreError(#[from] TreeStoreError),

    #[error("Prover error: {0}")]
    ProverError(#[from] ProverError),

    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),

    #[error("Pool error: {0}")]
    PoolError(#[from] PoolError),

    #[error("Job error: {0}")]
    JobError(#[from] JobError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Worker error: {0}")]
    WorkerError(String),
}
