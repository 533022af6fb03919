use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct FeeCliArgs {
    /// Service fee charged on withdrawals, in percent of the withdrawn amount.
    #[arg(env = "RELAYER_SERVICE_FEE", long, default_value = "0.05")]
    pub service_fee: String,

    /// Service fee charged on mining withdrawals, in percent of the withdrawn points.
    #[arg(env = "RELAYER_MINING_SERVICE_FEE", long, default_value = "0.05")]
    pub mining_service_fee: String,

    /// Account receiving the fees. Defaults to the relayer account.
    #[arg(env = "RELAYER_REWARD_ACCOUNT", long)]
    pub reward_account: Option<String>,
}
