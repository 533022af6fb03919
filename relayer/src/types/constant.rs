/// Gas limits used when pricing each kind of relayed call
pub const GAS_LIMIT_POOL_WITHDRAW: u64 = 350_000;
pub const GAS_LIMIT_MINING_REWARD: u64 = 455_000;
pub const GAS_LIMIT_MINING_WITHDRAW: u64 = 400_000;

/// Retry ceiling once a stale-root revert has been mined
pub const MAX_POST_RECEIPT_RETRIES: u32 = 3;
/// Retry ceiling for stale-root rejections before any receipt exists
pub const MAX_PRE_RECEIPT_RETRIES: u32 = 5;

/// Revert reasons emitted by the miner when a proof targets an outdated root
pub const STALE_ROOT_REASONS: [&str; 2] = ["Outdated account merkle root", "Outdated tree update merkle root"];

/// Symbol under which the pool token price is cached
pub const POOL_TOKEN_SYMBOL: &str = "poof";

/// Service fee percentages are stored with this many decimals
pub const SERVICE_FEE_DECIMALS: u8 = 10;

pub const GAS_PRICE_KEY: &str = "gasPrices";
pub const GAS_PRICE_FIELD: &str = "min";
pub const PRICES_KEY: &str = "prices";
pub const DEFAULT_TREE_KEY: &str = "tree:elements";
pub const DEFAULT_TREE_CHANNEL: &str = "treeUpdate";

pub const JOBS_COLLECTION: &str = "jobs";

pub const MAX_RECEIPT_ATTEMPTS: usize = 120;
/// Further waits on a broadcast whose receipt wait failed
pub const MAX_RECEIPT_WAITS: u32 = 3;
pub const MAX_CONFIRMATION_ATTEMPTS: usize = 30;

/// Failure reason recorded for jobs a restart interrupted mid-flight
pub const INTERRUPTED_JOB_REASON: &str = "Relayer restarted while the job was in flight, check its transaction hash";
