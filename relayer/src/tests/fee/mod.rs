use alloy::primitives::{B256, U256};
use assert_matches::assert_matches;
use rstest::*;

use crate::core::client::cache::{MockPriceCache, PriceCacheError};
use crate::core::client::pool::MockPoolEconomics;
use crate::error::fee::INSUFFICIENT_FEE_MESSAGE;
use crate::error::FeeError;
use crate::fee::curve::{self, PoolState};
use crate::fee::{FeeContext, FeePolicy};
use crate::tests::common::{
    batch_reward_payload, dai_instance_address, deployment, eth_instance_address, fee_params, instance_withdraw_payload,
    mining_reward_payload, mining_withdraw_payload, pool_state, pool_withdraw_payload, DAI_PRICE, GAS_PRICE_MINIMUM,
    ONE_TOKEN, POOF_PRICE,
};
use crate::types::constant::{GAS_LIMIT_MINING_REWARD, GAS_LIMIT_MINING_WITHDRAW};
use crate::types::jobs::payload::RelayJob;
use crate::types::params::{Deployment, FeeParams};

/// 20 gwei * 350k gas + 0.05% of 1 eth
const ETH_WITHDRAW_FEE: u128 = 7_500_000_000_000_000;
/// 7e15 wei at 5e14 wei per dai, plus 0.05% of 100 dai
const DAI_WITHDRAW_FEE: u128 = 14_050_000_000_000_000_000;

#[fixture]
fn policy(fee_params: FeeParams, deployment: Deployment) -> FeePolicy {
    FeePolicy::new(fee_params, deployment)
}

fn withdraw_context(asset_price: Option<u64>) -> FeeContext {
    let gas_price_minimum = U256::from(GAS_PRICE_MINIMUM);
    FeeContext { gas_price_minimum, asset_price: asset_price.map(U256::from), pool: None }
}

fn mining_context(pool: PoolState) -> FeeContext {
    FeeContext {
        gas_price_minimum: U256::from(GAS_PRICE_MINIMUM),
        asset_price: Some(U256::from(POOF_PRICE)),
        pool: Some(pool),
    }
}

fn points(gas_limit: u64, pool: PoolState) -> U256 {
    curve::reward_points(U256::from(GAS_PRICE_MINIMUM), gas_limit, U256::from(POOF_PRICE), pool).unwrap()
}

#[rstest]
#[case::exact(0, true)]
#[case::above(1, true)]
fn native_withdraw_accepts_the_minimum_fee(policy: FeePolicy, #[case] extra: u128, #[case] accepted: bool) {
    let payload = instance_withdraw_payload(eth_instance_address(), U256::from(ETH_WITHDRAW_FEE + extra), U256::ZERO);
    let result = policy.verify(&RelayJob::Relay(payload), &withdraw_context(None));
    assert_eq!(result.is_ok(), accepted);
}

#[rstest]
fn native_withdraw_one_wei_short_is_rejected(policy: FeePolicy) {
    let payload = instance_withdraw_payload(eth_instance_address(), U256::from(ETH_WITHDRAW_FEE - 1), U256::ZERO);
    let err = policy.verify(&RelayJob::PoolWithdraw(payload), &withdraw_context(None)).unwrap_err();

    assert_matches!(err, FeeError::InsufficientFee { provided, desired } => {
        assert_eq!(provided, U256::from(ETH_WITHDRAW_FEE - 1));
        assert_eq!(desired, U256::from(ETH_WITHDRAW_FEE));
    });
    assert_eq!(err.to_string(), INSUFFICIENT_FEE_MESSAGE);
    assert!(err.is_insufficient());
}

#[rstest]
fn token_withdraw_is_priced_in_the_token(policy: FeePolicy) {
    let context = withdraw_context(Some(DAI_PRICE));

    let exact = instance_withdraw_payload(dai_instance_address(), U256::from(DAI_WITHDRAW_FEE), U256::ZERO);
    assert!(policy.verify(&RelayJob::Relay(exact), &context).is_ok());

    let short = instance_withdraw_payload(dai_instance_address(), U256::from(DAI_WITHDRAW_FEE - 1), U256::ZERO);
    assert_matches!(policy.verify(&RelayJob::Relay(short), &context), Err(FeeError::InsufficientFee { .. }));
}

#[rstest]
fn token_withdraw_refund_is_charged(policy: FeePolicy) {
    // A refund of 1e15 wei costs 2 more dai at 5e14 wei per dai
    let refund = U256::from(1_000_000_000_000_000u64);
    let fee = U256::from(DAI_WITHDRAW_FEE + 2 * ONE_TOKEN);
    let payload = instance_withdraw_payload(dai_instance_address(), fee, refund);
    assert!(policy.verify(&RelayJob::Relay(payload), &withdraw_context(Some(DAI_PRICE))).is_ok());

    let short = instance_withdraw_payload(dai_instance_address(), fee - U256::from(1), refund);
    assert!(policy.verify(&RelayJob::Relay(short), &withdraw_context(Some(DAI_PRICE))).is_err());
}

#[rstest]
fn v2_withdraw_uses_the_pool_denomination(policy: FeePolicy) {
    let amount = U256::from(100 * ONE_TOKEN);
    let context = withdraw_context(Some(DAI_PRICE));

    let exact = pool_withdraw_payload(amount, U256::from(DAI_WITHDRAW_FEE));
    assert!(policy.verify(&RelayJob::WithdrawV2(exact), &context).is_ok());

    let short = pool_withdraw_payload(amount, U256::from(DAI_WITHDRAW_FEE - 1));
    assert_matches!(policy.verify(&RelayJob::WithdrawV2(short), &context), Err(FeeError::InsufficientFee { .. }));
}

#[rstest]
fn unknown_instance_is_rejected(policy: FeePolicy) {
    let contract = alloy::primitives::Address::repeat_byte(0xee);
    let payload = instance_withdraw_payload(contract, U256::from(ETH_WITHDRAW_FEE), U256::ZERO);
    assert_matches!(
        policy.verify(&RelayJob::Relay(payload), &withdraw_context(None)),
        Err(FeeError::UnknownInstance(address)) if address == contract
    );
}

#[rstest]
fn zero_token_price_is_a_failure(policy: FeePolicy) {
    let payload = instance_withdraw_payload(dai_instance_address(), U256::from(DAI_WITHDRAW_FEE), U256::ZERO);
    assert_matches!(
        policy.verify(&RelayJob::Relay(payload), &withdraw_context(Some(0))),
        Err(FeeError::ZeroPrice(symbol)) if symbol == "dai"
    );
}

#[rstest]
fn mining_reward_boundary(policy: FeePolicy, pool_state: PoolState) {
    let desired = points(GAS_LIMIT_MINING_REWARD, pool_state);
    assert!(desired > U256::ZERO);
    let context = mining_context(pool_state);

    let exact = RelayJob::MiningReward(mining_reward_payload(desired, B256::ZERO));
    assert!(policy.verify(&exact, &context).is_ok());

    let short = RelayJob::MiningReward(mining_reward_payload(desired - U256::from(1), B256::ZERO));
    assert_matches!(policy.verify(&short, &context), Err(FeeError::InsufficientFee { desired: d, .. }) if d == desired);
}

#[rstest]
fn mining_withdraw_adds_the_service_percentage_of_the_amount(policy: FeePolicy, pool_state: PoolState) {
    let amount = U256::from(1000 * ONE_TOKEN);
    let curve_part = points(GAS_LIMIT_MINING_WITHDRAW, pool_state);
    let context = mining_context(pool_state);

    // 0.05% of the full withdrawn amount
    let desired = curve_part + amount * U256::from(5) / U256::from(10_000);
    let exact = RelayJob::MiningWithdraw(mining_withdraw_payload(amount, desired, B256::ZERO));
    assert!(policy.verify(&exact, &context).is_ok());

    let short = RelayJob::MiningWithdraw(mining_withdraw_payload(amount, desired - U256::from(1), B256::ZERO));
    assert_matches!(policy.verify(&short, &context), Err(FeeError::InsufficientFee { desired: d, .. }) if d == desired);
}

#[rstest]
fn mining_withdraw_with_oversized_amount_fails_closed(policy: FeePolicy, pool_state: PoolState) {
    let fee = points(GAS_LIMIT_MINING_WITHDRAW, pool_state);
    let scaled = policy.params().mining_service_fee_scaled;
    let amount = U256::MAX / scaled + U256::from(1) + fee;

    let job = RelayJob::MiningWithdraw(mining_withdraw_payload(amount, fee, B256::ZERO));
    assert_matches!(policy.verify(&job, &mining_context(pool_state)), Err(FeeError::Overflow));
}

#[rstest]
fn pool_withdraw_with_oversized_amount_fails_closed(policy: FeePolicy) {
    let payload = pool_withdraw_payload(U256::MAX, U256::MAX);
    assert_matches!(
        policy.verify(&RelayJob::WithdrawV2(payload), &withdraw_context(Some(DAI_PRICE))),
        Err(FeeError::Overflow)
    );
}

#[rstest]
fn batch_reward_fails_on_first_short_element(policy: FeePolicy, pool_state: PoolState) {
    let desired = points(GAS_LIMIT_MINING_REWARD, pool_state);
    let context = mining_context(pool_state);

    let valid = batch_reward_payload(&[desired, desired + U256::from(1), desired], B256::ZERO);
    assert!(policy.verify(&RelayJob::BatchReward(valid), &context).is_ok());

    let fees = [desired, desired - U256::from(1), desired, U256::ZERO];
    let short = batch_reward_payload(&fees, B256::ZERO);
    let err = policy.verify(&RelayJob::BatchReward(short), &context).unwrap_err();
    assert_matches!(err, FeeError::InsufficientBatchFee { index: 1, .. });
    assert!(err.to_string().starts_with(INSUFFICIENT_FEE_MESSAGE));
}

#[rstest]
fn exhausted_pool_fails_mining_jobs(policy: FeePolicy) {
    let pool = PoolState { balance: U256::from(1000), weight: U256::from(ONE_TOKEN) };
    let job = RelayJob::MiningReward(mining_reward_payload(U256::MAX, B256::ZERO));
    assert_matches!(policy.verify(&job, &mining_context(pool)), Err(FeeError::PoolExhausted { .. }));
}

#[rstest]
#[tokio::test]
async fn native_withdraw_reads_gas_price_only(policy: FeePolicy) {
    let mut cache = MockPriceCache::new();
    cache.expect_gas_price_minimum().times(1).returning(|| Ok(U256::from(GAS_PRICE_MINIMUM)));
    cache.expect_asset_price().never();
    let mut pool = MockPoolEconomics::new();
    pool.expect_pool_balance().never();
    pool.expect_pool_weight().never();

    let payload = instance_withdraw_payload(eth_instance_address(), U256::from(ETH_WITHDRAW_FEE), U256::ZERO);
    policy.check(&RelayJob::Relay(payload), &cache, &pool).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn batch_reward_reads_market_data_once(policy: FeePolicy, pool_state: PoolState) {
    let mut cache = MockPriceCache::new();
    cache.expect_gas_price_minimum().times(1).returning(|| Ok(U256::from(GAS_PRICE_MINIMUM)));
    cache
        .expect_asset_price()
        .withf(|symbol| symbol == "poof")
        .times(1)
        .returning(|_| Ok(U256::from(POOF_PRICE)));
    let mut pool = MockPoolEconomics::new();
    pool.expect_pool_balance().times(1).returning(move || Ok(pool_state.balance));
    pool.expect_pool_weight().times(1).returning(move || Ok(pool_state.weight));

    let desired = points(GAS_LIMIT_MINING_REWARD, pool_state);
    let job = RelayJob::BatchReward(batch_reward_payload(&[desired; 5], B256::ZERO));
    policy.check(&job, &cache, &pool).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn missing_price_is_a_hard_failure(policy: FeePolicy) {
    let mut cache = MockPriceCache::new();
    cache.expect_gas_price_minimum().returning(|| Ok(U256::from(GAS_PRICE_MINIMUM)));
    cache.expect_asset_price().returning(|symbol| Err(PriceCacheError::Missing(symbol.to_string())));
    let pool = MockPoolEconomics::new();

    let payload = instance_withdraw_payload(dai_instance_address(), U256::from(DAI_WITHDRAW_FEE), U256::ZERO);
    let err = policy.check(&RelayJob::Relay(payload), &cache, &pool).await.unwrap_err();
    assert!(!err.is_insufficient());
    assert_matches!(err, FeeError::PriceCache(PriceCacheError::Missing(symbol)) if symbol == "dai");
}
