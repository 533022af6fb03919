pub mod ethereum;

use alloy::contract::Error as ContractError;
use alloy::primitives::U256;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Reward swap call failed: {0}")]
    Contract(#[from] ContractError),
}

/// Reads of the reward swap pool used to price mining operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolEconomics: Send + Sync {
    /// Virtual token balance of the pool
    async fn pool_balance(&self) -> Result<U256, PoolError>;

    async fn pool_weight(&self) -> Result<U256, PoolError>;
}
