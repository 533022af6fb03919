use clap::{Parser, Subcommand};

pub mod chain;
pub mod database;
pub mod deployment;
pub mod fee;
pub mod prover;
pub mod redis;
pub mod server;
pub mod service;

#[derive(Parser, Debug)]
#[command(
    name = "relayer",
    about = "Relayer - submits shielded pool withdrawals and mining operations on behalf of users",
    after_help = "Examples:\n  \
    relayer run --rpc-url http://localhost:8545 --private-key 0x... --deployment-file deployment.json\n  \
    relayer run --queue memory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relayer service
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    #[clap(flatten)]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten)]
    pub chain_args: chain::ChainCliArgs,

    #[clap(flatten)]
    pub redis_args: redis::RedisCliArgs,

    #[clap(flatten)]
    pub mongodb_args: database::MongoDbCliArgs,

    #[clap(flatten)]
    pub prover_args: prover::ProverCliArgs,

    #[clap(flatten)]
    pub fee_args: fee::FeeCliArgs,

    #[clap(flatten)]
    pub service_args: service::ServiceCliArgs,

    #[clap(flatten)]
    pub deployment_args: deployment::DeploymentCliArgs,
}
