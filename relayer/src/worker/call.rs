use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolCall;

use crate::core::client::prover::TreeUpdate;
use crate::core::client::transaction::TxCall;
use crate::core::contracts::{Instance, Miner, Proxy, ShieldedPool};
use crate::types::jobs::payload::RelayJob;
use crate::types::params::ChainParams;

/// Builds the on-chain call for `job`. A tree update, when given, re-anchors a
/// mining proof onto a newer account root. Batches never carry one.
pub fn build_call(job: &RelayJob, chain: &ChainParams, update: Option<&TreeUpdate>) -> TxCall {
    match job {
        RelayJob::Relay(payload) => {
            let args = &payload.args;
            let call = Instance::withdrawCall {
                proof: payload.proof.clone(),
                root: args.root(),
                nullifierHash: args.nullifier_hash(),
                recipient: args.recipient(),
                relayer: args.relayer(),
                fee: args.fee(),
                refund: args.refund(),
            };
            TxCall { to: payload.contract, data: call.abi_encode().into(), value: args.refund() }
        }
        RelayJob::PoolWithdraw(payload) => {
            let args = &payload.args;
            let call = Proxy::withdrawCall {
                instance: payload.contract,
                proof: payload.proof.clone(),
                root: args.root(),
                nullifierHash: args.nullifier_hash(),
                recipient: args.recipient(),
                relayer: args.relayer(),
                fee: args.fee(),
                refund: args.refund(),
            };
            TxCall { to: chain.proxy_address, data: call.abi_encode().into(), value: args.refund() }
        }
        RelayJob::WithdrawV2(payload) => {
            let call = ShieldedPool::withdrawCall { proof: payload.proof.clone(), args: (&payload.args).into() };
            TxCall { to: payload.contract, data: call.abi_encode().into(), value: U256::ZERO }
        }
        RelayJob::MiningReward(payload) => {
            let data: Bytes = match update {
                None => Miner::reward_0Call { proof: payload.proof.clone(), args: (&payload.args).into() }
                    .abi_encode()
                    .into(),
                Some(update) => Miner::reward_1Call {
                    proof: payload.proof.clone(),
                    args: (&payload.args).into(),
                    treeUpdateProof: update.proof.clone(),
                    treeUpdateArgs: (&update.args).into(),
                }
                .abi_encode()
                .into(),
            };
            TxCall { to: chain.miner_address, data, value: U256::ZERO }
        }
        RelayJob::MiningWithdraw(payload) => {
            let data: Bytes = match update {
                None => Miner::withdraw_0Call { proof: payload.proof.clone(), args: (&payload.args).into() }
                    .abi_encode()
                    .into(),
                Some(update) => Miner::withdraw_1Call {
                    proof: payload.proof.clone(),
                    args: (&payload.args).into(),
                    treeUpdateProof: update.proof.clone(),
                    treeUpdateArgs: (&update.args).into(),
                }
                .abi_encode()
                .into(),
            };
            TxCall { to: chain.miner_address, data, value: U256::ZERO }
        }
        RelayJob::BatchReward(payload) => {
            let call = Miner::batchRewardCall { rewardArgs: payload.reward_args.clone() };
            TxCall { to: chain.miner_address, data: call.abi_encode().into(), value: U256::ZERO }
        }
    }
}
