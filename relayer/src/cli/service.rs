use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct ServiceCliArgs {
    /// Pause before resubmitting a transaction rejected on an outdated root, in milliseconds.
    #[arg(env = "RELAYER_STALE_ROOT_BACKOFF_MS", long, default_value = "3000")]
    pub stale_root_backoff_ms: u64,

    /// Interval between queue polls, in milliseconds.
    #[arg(env = "RELAYER_QUEUE_POLL_INTERVAL_MS", long, default_value = "1000")]
    pub queue_poll_interval_ms: u64,

    /// Confirmations tracked after a transaction is mined.
    #[arg(env = "RELAYER_REQUIRED_CONFIRMATIONS", long, default_value = "4")]
    pub required_confirmations: u64,

    /// Pause before resubscribing to tree updates after the subscription ends, in milliseconds.
    #[arg(env = "RELAYER_TREE_RESUBSCRIBE_BACKOFF_MS", long, default_value = "1000")]
    pub tree_resubscribe_backoff_ms: u64,
}
