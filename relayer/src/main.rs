use clap::Parser as _;
use dotenvy::dotenv;
use relayer::cli::{Cli, Commands, RunCmd};
use relayer::config::Config;
use relayer::server::setup_server;
use relayer::utils::logging::init_logging;
use relayer::worker::initialize_worker;
use relayer::{RelayerError, RelayerResult};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Start the server and the worker
#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    info!("Starting relayer");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { run_command } => {
            info!("Executing run command with args: {:?}", run_command.server_args);
            match run_relayer(run_command).await {
                Ok(_) => {
                    info!("Relayer service stopped");
                }
                Err(e) => {
                    error!(
                        error = %e,
                        error_chain = ?e,
                        "Failed to run relayer service"
                    );
                    panic!("Failed to run relayer service: {}", e);
                }
            }
        }
    }
}

async fn run_relayer(run_cmd: &RunCmd) -> RelayerResult<()> {
    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);
    debug!("Configuration initialized");

    let (address, server_handle) = setup_server(config.clone()).await?;
    debug!(address = %address, "Application router initialized");

    let worker_controller = initialize_worker(config.clone()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Drain the current job before closing the api
    worker_controller.shutdown().await;
    server_handle.shutdown().await.map_err(|e| RelayerError::WorkerError(format!("Server task failed: {e}")))?;

    info!("Relayer service shutting down");
    Ok(())
}
