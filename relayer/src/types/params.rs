use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::cli::chain::ChainCliArgs;
use crate::cli::database::MongoDbCliArgs;
use crate::cli::prover::ProverCliArgs;
use crate::cli::redis::RedisCliArgs;
use crate::cli::server::ServerCliArgs;
use crate::cli::service::ServiceCliArgs;
use crate::error::FeeError;
use crate::types::constant::SERVICE_FEE_DECIMALS;
use crate::RelayerError;

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct ChainParams {
    pub rpc_url: Url,
    pub private_key: String,
    pub chain_id: Option<u64>,
    pub proxy_address: Address,
    pub miner_address: Address,
    pub reward_swap_address: Address,
    /// Fixed gas price in wei, the node's estimate is used when unset
    pub gas_price: Option<u128>,
    /// Percentage added to the gas price of a replacement transaction
    pub gas_bump_percent: u64,
    pub receipt_poll_interval: Duration,
}

impl std::fmt::Debug for ChainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainParams")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("proxy_address", &self.proxy_address)
            .field("miner_address", &self.miner_address)
            .field("reward_swap_address", &self.reward_swap_address)
            .field("gas_price", &self.gas_price)
            .field("gas_bump_percent", &self.gas_bump_percent)
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .finish_non_exhaustive()
    }
}

impl From<ServerCliArgs> for ServerParams {
    fn from(args: ServerCliArgs) -> Self {
        Self { host: args.host, port: args.port }
    }
}

impl TryFrom<ChainCliArgs> for ChainParams {
    type Error = RelayerError;

    fn try_from(args: ChainCliArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            rpc_url: args.rpc_url,
            private_key: args.private_key,
            chain_id: args.chain_id,
            proxy_address: parse_address("proxy address", &args.proxy_address)?,
            miner_address: parse_address("miner address", &args.miner_address)?,
            reward_swap_address: parse_address("reward swap address", &args.reward_swap_address)?,
            gas_price: args.gas_price,
            gas_bump_percent: args.gas_bump_percent,
            receipt_poll_interval: Duration::from_millis(args.receipt_poll_interval_ms),
        })
    }
}

pub fn parse_address(name: &str, value: &str) -> Result<Address, RelayerError> {
    Address::from_str(value).map_err(|e| RelayerError::ConfigError(format!("Invalid {name} {value}: {e}")))
}

/// Service fee settings. Percentages are kept both as configured and scaled by `10^10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeParams {
    pub service_fee: String,
    pub mining_service_fee: String,
    pub service_fee_scaled: U256,
    pub mining_service_fee_scaled: U256,
    pub reward_account: Address,
}

impl FeeParams {
    pub fn new(service_fee: &str, mining_service_fee: &str, reward_account: Address) -> Result<Self, RelayerError> {
        Ok(Self {
            service_fee: service_fee.to_string(),
            mining_service_fee: mining_service_fee.to_string(),
            service_fee_scaled: scale_percent(service_fee)?,
            mining_service_fee_scaled: scale_percent(mining_service_fee)?,
            reward_account,
        })
    }
}

fn scale_percent(percent: &str) -> Result<U256, RelayerError> {
    parse_unsigned_units(percent, SERVICE_FEE_DECIMALS).ok_or_else(|| {
        RelayerError::ConfigError(format!("Invalid service fee {percent}: expected a non-negative decimal"))
    })
}

/// Parses a decimal string into base units. `None` when malformed or negative.
pub fn parse_unsigned_units(value: &str, decimals: u8) -> Option<U256> {
    match parse_units(value, decimals).ok()? {
        ParseUnits::I256(signed) if signed.is_negative() => None,
        units => Some(units.get_absolute()),
    }
}

#[derive(Debug, Clone)]
pub struct ServiceParams {
    /// Pause before resubmitting after a pre-receipt stale root rejection
    pub stale_root_backoff: Duration,
    pub queue_poll_interval: Duration,
    pub required_confirmations: u64,
    /// Pause before subscribing again once the tree update subscription ends
    pub tree_resubscribe_backoff: Duration,
}

impl From<ServiceCliArgs> for ServiceParams {
    fn from(args: ServiceCliArgs) -> Self {
        Self {
            stale_root_backoff: Duration::from_millis(args.stale_root_backoff_ms),
            queue_poll_interval: Duration::from_millis(args.queue_poll_interval_ms),
            required_confirmations: args.required_confirmations,
            tree_resubscribe_backoff: Duration::from_millis(args.tree_resubscribe_backoff_ms),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisParams {
    pub url: String,
    pub tree_key: String,
    pub tree_channel: String,
}

impl From<RedisCliArgs> for RedisParams {
    fn from(args: RedisCliArgs) -> Self {
        Self { url: args.redis_url, tree_key: args.tree_key, tree_channel: args.tree_channel }
    }
}

#[derive(Debug, Clone)]
pub struct MongoParams {
    pub connection_url: String,
    pub database_name: String,
}

impl From<MongoDbCliArgs> for MongoParams {
    fn from(args: MongoDbCliArgs) -> Self {
        Self { connection_url: args.mongodb_connection_url, database_name: args.mongodb_database_name }
    }
}

#[derive(Debug, Clone)]
pub struct ProverParams {
    pub url: Url,
}

impl From<ProverCliArgs> for ProverParams {
    fn from(args: ProverCliArgs) -> Self {
        Self { url: args.prover_url }
    }
}

/// A v1 instance with a fixed denomination
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceEntry {
    pub address: Address,
    pub symbol: String,
    /// Denomination in whole tokens, e.g. "100"
    pub amount: String,
    pub decimals: u8,
}

impl InstanceEntry {
    pub fn amount_in_base_units(&self) -> Result<U256, FeeError> {
        parse_unsigned_units(&self.amount, self.decimals)
            .ok_or_else(|| FeeError::InvalidAmount { amount: self.amount.clone(), decimals: self.decimals })
    }
}

/// A v2 pool
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub pool_address: Address,
    pub token_address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Contracts the relayer is willing to relay for
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Symbol of the chain's native currency, e.g. "celo"
    pub native_symbol: String,
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
}

impl Deployment {
    pub fn load(path: &Path) -> Result<Self, RelayerError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn instance(&self, address: &Address) -> Option<&InstanceEntry> {
        self.instances.iter().find(|entry| &entry.address == address)
    }

    pub fn pool(&self, address: &Address) -> Option<&PoolEntry> {
        self.pools.iter().find(|entry| &entry.pool_address == address)
    }

    pub fn is_native(&self, symbol: &str) -> bool {
        self.native_symbol.eq_ignore_ascii_case(symbol)
    }
}
