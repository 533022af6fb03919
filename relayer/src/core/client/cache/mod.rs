pub mod redis;

use alloy::primitives::U256;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceCacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("No cached value for {0}")]
    Missing(String),

    #[error("Malformed cached value {value} for {key}")]
    Malformed { key: String, value: String },
}

/// Read-only view of the gas and price quotes maintained by the watchers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Lowest acceptable gas price, in wei
    async fn gas_price_minimum(&self) -> Result<U256, PriceCacheError>;
    /// Price of one whole unit of `symbol`, in wei of the native currency
    async fn asset_price(&self, symbol: &str) -> Result<U256, PriceCacheError>;
}
