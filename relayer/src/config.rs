use std::time::Duration;

use redis::Client as RedisClient;
use tracing::info;

use crate::cli::database::QueueBackend;
use crate::cli::RunCmd;
use crate::core::client::cache::redis::RedisPriceCache;
use crate::core::client::pool::ethereum::RewardSwapContract;
use crate::core::client::prover::http::HttpProofEngine;
use crate::core::client::queue::memory::InMemoryJobQueue;
use crate::core::client::queue::mongodb::MongoJobQueue;
use crate::core::client::transaction::ethereum::EthereumTransactionManager;
use crate::core::client::tree::redis::RedisTreeStore;
use crate::core::client::{JobQueue, PoolEconomics, PriceCache, ProofEngine, TransactionManager, TreeStore};
use crate::fee::FeePolicy;
use crate::types::params::{
    parse_address, ChainParams, Deployment, FeeParams, MongoParams, ProverParams, RedisParams, ServerParams,
    ServiceParams,
};
use crate::{RelayerError, RelayerResult};

pub struct RelayerParams {
    pub server: ServerParams,
    pub chain: ChainParams,
    pub service: ServiceParams,
}

/// Backends of every external capability the relayer consumes
pub struct RelayerClients {
    pub queue: Box<dyn JobQueue>,
    pub price_cache: Box<dyn PriceCache>,
    pub tree_store: Box<dyn TreeStore>,
    pub prover: Box<dyn ProofEngine>,
    pub transaction_manager: Box<dyn TransactionManager>,
    pub pool: Box<dyn PoolEconomics>,
}

/// The app config, shared as `Arc<Config>` by the server and the worker
pub struct Config {
    params: RelayerParams,
    /// Fee settings and the deployment they apply to
    fee_policy: FeePolicy,
    /// Job storage
    queue: Box<dyn JobQueue>,
    /// Gas and asset prices published by the price watcher
    price_cache: Box<dyn PriceCache>,
    /// Account tree published by the tree watcher
    tree_store: Box<dyn TreeStore>,
    /// Tree update proof generation
    prover: Box<dyn ProofEngine>,
    /// Broadcasts from the relayer account
    transaction_manager: Box<dyn TransactionManager>,
    /// Reward swap pool reads
    pool: Box<dyn PoolEconomics>,
}

impl Config {
    pub fn new(params: RelayerParams, fee_policy: FeePolicy, clients: RelayerClients) -> Self {
        Self {
            params,
            fee_policy,
            queue: clients.queue,
            price_cache: clients.price_cache,
            tree_store: clients.tree_store,
            prover: clients.prover,
            transaction_manager: clients.transaction_manager,
            pool: clients.pool,
        }
    }

    /// Validates the command line and connects every backend
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> RelayerResult<Self> {
        let chain = ChainParams::try_from(run_cmd.chain_args.clone())?;
        let service = ServiceParams::from(run_cmd.service_args.clone());
        let redis_params = RedisParams::from(run_cmd.redis_args.clone());
        let mongo_params = MongoParams::from(run_cmd.mongodb_args.clone());
        let prover_params = ProverParams::from(run_cmd.prover_args.clone());
        let deployment = Deployment::load(&run_cmd.deployment_args.deployment_file)?;

        let transaction_manager = EthereumTransactionManager::new(&chain)?;
        let reward_account = match &run_cmd.fee_args.reward_account {
            Some(account) => parse_address("reward account", account)?,
            None => transaction_manager.address(),
        };
        let fee_params =
            FeeParams::new(&run_cmd.fee_args.service_fee, &run_cmd.fee_args.mining_service_fee, reward_account)?;
        info!(
            relayer_account = %transaction_manager.address(),
            reward_account = %reward_account,
            instances = deployment.instances.len(),
            pools = deployment.pools.len(),
            "Relayer configured"
        );

        let queue = Self::build_queue(run_cmd.mongodb_args.queue_backend, &mongo_params, service.queue_poll_interval)
            .await?;
        let (price_cache, tree_store) = Self::build_redis_clients(&redis_params).await?;
        let pool = Box::new(RewardSwapContract::new(chain.rpc_url.clone(), chain.reward_swap_address));

        let clients = RelayerClients {
            queue,
            price_cache,
            tree_store,
            prover: Box::new(HttpProofEngine::new(prover_params.url)),
            transaction_manager: Box::new(transaction_manager),
            pool,
        };
        let params = RelayerParams { server: ServerParams::from(run_cmd.server_args.clone()), chain, service };
        Ok(Self::new(params, FeePolicy::new(fee_params, deployment), clients))
    }

    async fn build_queue(
        backend: QueueBackend,
        params: &MongoParams,
        poll_interval: Duration,
    ) -> RelayerResult<Box<dyn JobQueue>> {
        match backend {
            QueueBackend::Mongodb => Ok(Box::new(MongoJobQueue::new(params, poll_interval).await?)),
            QueueBackend::Memory => Ok(Box::new(InMemoryJobQueue::new())),
        }
    }

    async fn build_redis_clients(
        params: &RedisParams,
    ) -> RelayerResult<(Box<dyn PriceCache>, Box<dyn TreeStore>)> {
        let client = RedisClient::open(params.url.as_str())
            .map_err(|e| RelayerError::ConfigError(format!("Invalid redis url {}: {e}", params.url)))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| RelayerError::ConfigError(format!("Failed to connect to redis: {e}")))?;

        let price_cache = Box::new(RedisPriceCache::new(connection.clone()));
        let tree_store = Box::new(RedisTreeStore::new(
            client,
            connection,
            params.tree_key.clone(),
            params.tree_channel.clone(),
        ));
        Ok((price_cache, tree_store))
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.params.server
    }

    pub fn chain_params(&self) -> &ChainParams {
        &self.params.chain
    }

    pub fn service_params(&self) -> &ServiceParams {
        &self.params.service
    }

    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    pub fn queue(&self) -> &dyn JobQueue {
        self.queue.as_ref()
    }

    pub fn price_cache(&self) -> &dyn PriceCache {
        self.price_cache.as_ref()
    }

    pub fn tree_store(&self) -> &dyn TreeStore {
        self.tree_store.as_ref()
    }

    pub fn prover(&self) -> &dyn ProofEngine {
        self.prover.as_ref()
    }

    pub fn transaction_manager(&self) -> &dyn TransactionManager {
        self.transaction_manager.as_ref()
    }

    pub fn pool(&self) -> &dyn PoolEconomics {
        self.pool.as_ref()
    }
}
