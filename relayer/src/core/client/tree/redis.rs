use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::debug;

use super::{TreeStore, TreeStoreError};

pub struct RedisTreeStore {
    client: Client,
    connection: ConnectionManager,
    key: String,
    channel: String,
}

impl RedisTreeStore {
    pub fn new(client: Client, connection: ConnectionManager, key: String, channel: String) -> Self {
        Self { client, connection, key, channel }
    }
}

#[async_trait]
impl TreeStore for RedisTreeStore {
    async fn get(&self) -> Result<String, TreeStoreError> {
        let mut connection = self.connection.clone();
        let tree: Option<String> = connection.get(&self.key).await?;
        tree.ok_or_else(|| TreeStoreError::Missing(self.key.clone()))
    }

    async fn subscribe(&self) -> Result<BoxStream<'static, ()>, TreeStoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        debug!(channel = %self.channel, "Subscribed to tree updates");
        Ok(pubsub.into_on_message().map(|_| ()).boxed())
    }
}
