pub mod redis;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Tree snapshot not found under {0}")]
    Missing(String),
}

/// Shared store holding the serialized account tree plus a notification
/// channel fired whenever the on-chain root advances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn get(&self) -> Result<String, TreeStoreError>;
    /// Each item of the stream is one "tree advanced" notification
    async fn subscribe(&self) -> Result<BoxStream<'static, ()>, TreeStoreError>;
}
