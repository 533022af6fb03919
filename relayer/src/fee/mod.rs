pub mod curve;

use alloy::primitives::U256;
use tracing::debug;

use crate::core::client::{PoolEconomics, PriceCache};
use crate::error::FeeError;
use crate::types::constant::{
    GAS_LIMIT_MINING_REWARD, GAS_LIMIT_MINING_WITHDRAW, GAS_LIMIT_POOL_WITHDRAW, POOL_TOKEN_SYMBOL,
};
use crate::types::jobs::payload::RelayJob;
use crate::types::params::{Deployment, FeeParams};
use curve::{AssetQuote, PoolState};

/// Market data a fee check is evaluated against. Only the fields the job kind
/// needs are loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeContext {
    pub gas_price_minimum: U256,
    /// Price of the job's asset, `None` for the native currency
    pub asset_price: Option<U256>,
    pub pool: Option<PoolState>,
}

/// Denomination of a withdrawal as seen by the fee formula
struct Denomination<'a> {
    symbol: &'a str,
    decimals: u8,
    amount: U256,
    refund: U256,
    fee: U256,
}

/// Decides the minimum fee of a job and rejects jobs paying less
#[derive(Debug, Clone)]
pub struct FeePolicy {
    params: FeeParams,
    deployment: Deployment,
}

impl FeePolicy {
    pub fn new(params: FeeParams, deployment: Deployment) -> Self {
        Self { params, deployment }
    }

    pub fn params(&self) -> &FeeParams {
        &self.params
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Loads the current market data for `job` and verifies its fee
    pub async fn check(
        &self,
        job: &RelayJob,
        cache: &dyn PriceCache,
        pool: &dyn PoolEconomics,
    ) -> Result<(), FeeError> {
        let context = self.load_context(job, cache, pool).await?;
        debug!(?context, job_type = %job.kind(), "Fee context loaded");
        self.verify(job, &context)
    }

    pub async fn load_context(
        &self,
        job: &RelayJob,
        cache: &dyn PriceCache,
        pool: &dyn PoolEconomics,
    ) -> Result<FeeContext, FeeError> {
        let gas_price_minimum = cache.gas_price_minimum().await?;

        match job {
            RelayJob::Relay(_) | RelayJob::PoolWithdraw(_) | RelayJob::WithdrawV2(_) => {
                let symbol = self.denomination(job)?.symbol;
                let asset_price =
                    if self.deployment.is_native(symbol) { None } else { Some(cache.asset_price(symbol).await?) };
                Ok(FeeContext { gas_price_minimum, asset_price, pool: None })
            }
            RelayJob::MiningReward(_) | RelayJob::MiningWithdraw(_) | RelayJob::BatchReward(_) => {
                let asset_price = Some(cache.asset_price(POOL_TOKEN_SYMBOL).await?);
                let state = PoolState { balance: pool.pool_balance().await?, weight: pool.pool_weight().await? };
                Ok(FeeContext { gas_price_minimum, asset_price, pool: Some(state) })
            }
        }
    }

    /// Pure fee check against an already loaded context. Equal fees are accepted.
    pub fn verify(&self, job: &RelayJob, context: &FeeContext) -> Result<(), FeeError> {
        match job {
            RelayJob::Relay(_) | RelayJob::PoolWithdraw(_) | RelayJob::WithdrawV2(_) => {
                let denomination = self.denomination(job)?;
                let quote = context.asset_price.map(|price| AssetQuote { price, decimals: denomination.decimals });
                let desired = curve::withdraw_fee(
                    context.gas_price_minimum,
                    GAS_LIMIT_POOL_WITHDRAW,
                    denomination.amount,
                    denomination.refund,
                    self.params.service_fee_scaled,
                    quote,
                    denomination.symbol,
                )?;
                ensure_sufficient(denomination.fee, desired)
            }
            RelayJob::MiningReward(payload) => {
                let desired = self.reward_points(context, GAS_LIMIT_MINING_REWARD)?;
                ensure_sufficient(payload.args.fee, desired)
            }
            RelayJob::MiningWithdraw(payload) => {
                let points = self.reward_points(context, GAS_LIMIT_MINING_WITHDRAW)?;
                let service_fee = curve::percent_fee(payload.args.amount, self.params.mining_service_fee_scaled)?;
                let desired = points.checked_add(service_fee).ok_or(FeeError::Overflow)?;
                ensure_sufficient(payload.args.ext_data.fee, desired)
            }
            RelayJob::BatchReward(payload) => {
                let desired = self.reward_points(context, GAS_LIMIT_MINING_REWARD)?;
                for (index, args) in payload.args.iter().enumerate() {
                    if args.fee < desired {
                        return Err(FeeError::InsufficientBatchFee { index, provided: args.fee, desired });
                    }
                }
                Ok(())
            }
        }
    }

    fn reward_points(&self, context: &FeeContext, gas_limit: u64) -> Result<U256, FeeError> {
        let price = context.asset_price.ok_or(FeeError::MissingContext("pool token price"))?;
        let pool = context.pool.ok_or(FeeError::MissingContext("pool state"))?;
        curve::reward_points(context.gas_price_minimum, gas_limit, price, pool)
    }

    fn denomination<'a>(&'a self, job: &RelayJob) -> Result<Denomination<'a>, FeeError> {
        match job {
            RelayJob::Relay(payload) | RelayJob::PoolWithdraw(payload) => {
                let instance =
                    self.deployment.instance(&payload.contract).ok_or(FeeError::UnknownInstance(payload.contract))?;
                Ok(Denomination {
                    symbol: &instance.symbol,
                    decimals: instance.decimals,
                    amount: instance.amount_in_base_units()?,
                    refund: payload.args.refund(),
                    fee: payload.args.fee(),
                })
            }
            RelayJob::WithdrawV2(payload) => {
                let pool = self.deployment.pool(&payload.contract).ok_or(FeeError::UnknownPool(payload.contract))?;
                Ok(Denomination {
                    symbol: &pool.symbol,
                    decimals: pool.decimals,
                    amount: payload.args.amount,
                    refund: U256::ZERO,
                    fee: payload.args.ext_data.fee,
                })
            }
            _ => Err(FeeError::MissingContext("withdrawal denomination")),
        }
    }
}

fn ensure_sufficient(provided: U256, desired: U256) -> Result<(), FeeError> {
    if provided < desired {
        return Err(FeeError::InsufficientFee { provided, desired });
    }
    Ok(())
}
