//! Fixed-point fee arithmetic. Every quantity is an integer in the smallest unit
//! of its token; ratios and logarithms are carried with 18 decimals (WAD).

use alloy::primitives::{uint, U256};

use crate::error::FeeError;

pub const WAD: U256 = uint!(1_000000000000000000_U256);

/// Percentages are scaled by 10^10 and expressed out of 100
const PERCENT_DENOMINATOR: U256 = uint!(1_000000000000_U256);

/// Internal precision of `ln_wad`
const ONE_36: U256 = uint!(1_000000000000000000000000000000000000_U256);
const TWO_36: U256 = uint!(2_000000000000000000000000000000000000_U256);
const LN2_36: U256 = uint!(693147180559945309417232121458176568_U256);

/// Natural logarithm of a WAD value. Inputs below one yield zero, the curve only
/// ever takes the log of ratios greater than or equal to one.
pub fn ln_wad(x: U256) -> U256 {
    let mut y = x.saturating_mul(WAD);
    if y <= ONE_36 {
        return U256::ZERO;
    }

    // ln(y) = k * ln(2) + ln(y / 2^k) with y / 2^k in [1, 2)
    let mut k = U256::ZERO;
    while y >= TWO_36 {
        y /= U256::from(2);
        k += U256::from(1);
    }

    // ln(y) = 2 * atanh(z) = 2 * (z + z^3/3 + z^5/5 + ...) with z = (y - 1) / (y + 1)
    let z = (y - ONE_36) * ONE_36 / (y + ONE_36);
    let z_squared = z * z / ONE_36;
    let mut term = z;
    let mut denominator = U256::from(1);
    let mut sum = U256::ZERO;
    loop {
        let step = term / denominator;
        if step.is_zero() {
            break;
        }
        sum += step;
        term = term * z_squared / ONE_36;
        denominator += U256::from(2);
    }

    (k * LN2_36 + sum * U256::from(2)) / WAD
}

fn mul(a: U256, b: U256) -> Result<U256, FeeError> {
    a.checked_mul(b).ok_or(FeeError::Overflow)
}

fn add(a: U256, b: U256) -> Result<U256, FeeError> {
    a.checked_add(b).ok_or(FeeError::Overflow)
}

/// `amount * percent%`, with `scaled_percent` carrying 10 decimals
pub fn percent_fee(amount: U256, scaled_percent: U256) -> Result<U256, FeeError> {
    Ok(mul(amount, scaled_percent)? / PERCENT_DENOMINATOR)
}

/// Price of a non-native asset, in native wei per one whole asset unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetQuote {
    pub price: U256,
    pub decimals: u8,
}

/// Minimum fee of a pool withdrawal: gas reimbursement plus the service percentage.
/// A `None` quote means the pool is denominated in the native currency.
pub fn withdraw_fee(
    gas_price: U256,
    gas_limit: u64,
    amount: U256,
    refund: U256,
    scaled_percent: U256,
    quote: Option<AssetQuote>,
    symbol: &str,
) -> Result<U256, FeeError> {
    let expense = mul(gas_price, U256::from(gas_limit))?;
    let fee_percent = percent_fee(amount, scaled_percent)?;

    match quote {
        None => add(expense, fee_percent),
        Some(AssetQuote { price, decimals }) => {
            if price.is_zero() {
                return Err(FeeError::ZeroPrice(symbol.to_string()));
            }
            let unit = U256::from(10).checked_pow(U256::from(decimals)).ok_or(FeeError::Overflow)?;
            add(mul(add(expense, refund)?, unit)? / price, fee_percent)
        }
    }
}

/// Pool economics of a mining operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub balance: U256,
    pub weight: U256,
}

/// Reward points equivalent to the gas cost of a mining call:
/// `weight * ln(balance / (balance - expense_in_token))`
pub fn reward_points(
    gas_price: U256,
    gas_limit: u64,
    token_price: U256,
    pool: PoolState,
) -> Result<U256, FeeError> {
    if token_price.is_zero() {
        return Err(FeeError::ZeroPrice(crate::types::constant::POOL_TOKEN_SYMBOL.to_string()));
    }
    let expense = mul(gas_price, U256::from(gas_limit))?;
    let expense_in_token = mul(expense, WAD)? / token_price;
    if expense_in_token >= pool.balance {
        return Err(FeeError::PoolExhausted { balance: pool.balance, expense: expense_in_token });
    }

    let ratio = mul(pool.balance, WAD)? / (pool.balance - expense_in_token);
    Ok(mul(pool.weight, ln_wad(ratio))? / WAD)
}
