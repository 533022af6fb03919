use clap::Args;
use url::Url;

#[derive(Debug, Clone, Args)]
pub struct ChainCliArgs {
    /// The URL of the chain RPC node.
    #[arg(env = "RELAYER_RPC_URL", long)]
    pub rpc_url: Url,

    /// The private key of the relayer account.
    #[arg(env = "RELAYER_PRIVATE_KEY", long, hide_env_values = true)]
    pub private_key: String,

    /// Chain id used when signing. Read from the node when unset.
    #[arg(env = "RELAYER_CHAIN_ID", long)]
    pub chain_id: Option<u64>,

    /// The address of the instance proxy.
    #[arg(env = "RELAYER_PROXY_ADDRESS", long)]
    pub proxy_address: String,

    /// The address of the miner contract.
    #[arg(env = "RELAYER_MINER_ADDRESS", long)]
    pub miner_address: String,

    /// The address of the reward swap pool.
    #[arg(env = "RELAYER_REWARD_SWAP_ADDRESS", long)]
    pub reward_swap_address: String,

    /// Fixed gas price in wei. The node's estimate is used when unset.
    #[arg(env = "RELAYER_GAS_PRICE", long)]
    pub gas_price: Option<u128>,

    /// Percentage added to the gas price when a pending transaction is replaced.
    #[arg(env = "RELAYER_GAS_BUMP_PERCENT", long, default_value = "15")]
    pub gas_bump_percent: u64,

    /// Interval between receipt polls, in milliseconds.
    #[arg(env = "RELAYER_RECEIPT_POLL_INTERVAL_MS", long, default_value = "2000")]
    pub receipt_poll_interval_ms: u64,
}
