use alloy::primitives::U256;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{PriceCache, PriceCacheError};
use crate::types::constant::{GAS_PRICE_FIELD, GAS_PRICE_KEY, PRICES_KEY};
use crate::types::params::parse_unsigned_units;

const GWEI_DECIMALS: u8 = 9;
const NATIVE_DECIMALS: u8 = 18;

/// Quotes are stored as decimal strings: the gas price in gwei under
/// `gasPrices.min`, asset prices in native units under `prices.<symbol>`.
#[derive(Clone)]
pub struct RedisPriceCache {
    connection: ConnectionManager,
}

impl RedisPriceCache {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    async fn read(&self, key: &str, field: &str, decimals: u8) -> Result<U256, PriceCacheError> {
        let mut connection = self.connection.clone();
        let name = format!("{key}.{field}");
        let value: Option<String> = connection.hget(key, field).await?;
        let value = value.ok_or_else(|| PriceCacheError::Missing(name.clone()))?;
        parse_quote(name, value, decimals)
    }
}

/// A negative quote is as unusable as a malformed one
fn parse_quote(key: String, value: String, decimals: u8) -> Result<U256, PriceCacheError> {
    parse_unsigned_units(value.trim(), decimals).ok_or(PriceCacheError::Malformed { key, value })
}

#[async_trait]
impl PriceCache for RedisPriceCache {
    async fn gas_price_minimum(&self) -> Result<U256, PriceCacheError> {
        self.read(GAS_PRICE_KEY, GAS_PRICE_FIELD, GWEI_DECIMALS).await
    }

    async fn asset_price(&self, symbol: &str) -> Result<U256, PriceCacheError> {
        self.read(PRICES_KEY, &symbol.to_lowercase(), NATIVE_DECIMALS).await
    }
}
