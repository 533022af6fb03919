use clap::Args;

use crate::types::constant::{DEFAULT_TREE_CHANNEL, DEFAULT_TREE_KEY};

/// Parameters of the redis instance shared with the price and tree watchers.
#[derive(Debug, Clone, Args)]
pub struct RedisCliArgs {
    /// The URL of the redis server.
    #[arg(env = "RELAYER_REDIS_URL", long, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Key holding the serialized account tree.
    #[arg(env = "RELAYER_TREE_KEY", long, default_value = DEFAULT_TREE_KEY)]
    pub tree_key: String,

    /// Channel on which tree updates are announced.
    #[arg(env = "RELAYER_TREE_CHANNEL", long, default_value = DEFAULT_TREE_CHANNEL)]
    pub tree_channel: String,
}
