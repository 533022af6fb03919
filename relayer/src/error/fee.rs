use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::core::client::cache::PriceCacheError;
use crate::core::client::pool::PoolError;

pub const INSUFFICIENT_FEE_MESSAGE: &str =
    "Provided fee is not enough. Probably it is a Gas Price spike, try to resubmit.";

/// Errors raised while computing or enforcing the minimum relay fee
#[derive(Error, Debug)]
pub enum FeeError {
    #[error("Provided fee is not enough. Probably it is a Gas Price spike, try to resubmit.")]
    InsufficientFee { provided: U256, desired: U256 },

    /// One element of a batch carried a fee below the minimum, the whole batch is rejected
    #[error("Provided fee is not enough. Probably it is a Gas Price spike, try to resubmit. (batch element {index})")]
    InsufficientBatchFee { index: usize, provided: U256, desired: U256 },

    #[error("Instance {0} is not part of the deployment")]
    UnknownInstance(Address),

    #[error("Pool {0} is not part of the deployment")]
    UnknownPool(Address),

    #[error("Price for {0} is zero")]
    ZeroPrice(String),

    #[error("Invalid amount {amount} for {decimals} decimals")]
    InvalidAmount { amount: String, decimals: u8 },

    #[error("Pool balance {balance} cannot cover an expense of {expense}")]
    PoolExhausted { balance: U256, expense: U256 },

    #[error("Fee computation overflowed, the withdrawal amounts are out of range")]
    Overflow,

    #[error("Fee context has no {0}")]
    MissingContext(&'static str),

    #[error("Price cache error: {0}")]
    PriceCache(#[from] PriceCacheError),

    #[error("Pool read error: {0}")]
    Pool(#[from] PoolError),
}

impl FeeError {
    /// Whether this is a policy rejection rather than an infrastructure failure
    pub fn is_insufficient(&self) -> bool {
        matches!(self, FeeError::InsufficientFee { .. } | FeeError::InsufficientBatchFee { .. })
    }
}
