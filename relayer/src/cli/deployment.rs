use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct DeploymentCliArgs {
    /// JSON file listing the instances and pools the relayer serves.
    #[arg(env = "RELAYER_DEPLOYMENT_FILE", long, value_name = "PATH")]
    pub deployment_file: PathBuf,
}
