use clap::Args;
use url::Url;

#[derive(Debug, Clone, Args)]
pub struct ProverCliArgs {
    /// The URL of the tree update proving service.
    #[arg(env = "RELAYER_PROVER_URL", long, default_value = "http://127.0.0.1:8080")]
    pub prover_url: Url,
}
