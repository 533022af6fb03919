use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use url::Url;

use super::{PoolEconomics, PoolError};
use crate::core::contracts::RewardSwap::{self, RewardSwapInstance};

pub struct RewardSwapContract {
    contract: RewardSwapInstance<DynProvider>,
}

impl RewardSwapContract {
    pub fn new(rpc_url: Url, address: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self { contract: RewardSwap::new(address, provider) }
    }
}

#[async_trait]
impl PoolEconomics for RewardSwapContract {
    async fn pool_balance(&self) -> Result<U256, PoolError> {
        Ok(self.contract.poofVirtualBalance().call().await?)
    }

    async fn pool_weight(&self) -> Result<U256, PoolError> {
        Ok(self.contract.poolWeight().call().await?)
    }
}
