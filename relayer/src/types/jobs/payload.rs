use alloy::primitives::{Address, Bytes, B256, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::job::JobError;
use crate::types::jobs::job_item::JobRequest;
use crate::types::jobs::types::JobKind;

/// Positional arguments of a v1 instance withdrawal:
/// `[root, nullifierHash, recipient, relayer, fee, refund]`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InstanceWithdrawArgs(pub B256, pub B256, pub Address, pub Address, pub U256, pub U256);

impl InstanceWithdrawArgs {
    pub fn root(&self) -> B256 {
        self.0
    }
    pub fn nullifier_hash(&self) -> B256 {
        self.1
    }
    pub fn recipient(&self) -> Address {
        self.2
    }
    pub fn relayer(&self) -> Address {
        self.3
    }
    pub fn fee(&self) -> U256 {
        self.4
    }
    pub fn refund(&self) -> U256 {
        self.5
    }
}

/// Payload of `RELAY` and `POOL_WITHDRAW` jobs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InstanceWithdrawPayload {
    pub proof: Bytes,
    /// the instance the deposit was made to
    pub contract: Address,
    pub args: InstanceWithdrawArgs,
}

/// Account transition proven by a mining proof
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub input_root: B256,
    pub input_nullifier_hash: B256,
    pub output_root: B256,
    pub output_path_indices: U256,
    pub output_commitment: B256,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewardExtData {
    pub relayer: Address,
    pub encrypted_account: Bytes,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewardArgs {
    pub rate: U256,
    pub fee: U256,
    pub instance: Address,
    pub reward_nullifier: B256,
    pub ext_data_hash: B256,
    pub deposit_root: B256,
    pub withdrawal_root: B256,
    pub ext_data: RewardExtData,
    pub account: AccountUpdate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawExtData {
    pub fee: U256,
    pub recipient: Address,
    pub relayer: Address,
    pub encrypted_account: Bytes,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawArgs {
    pub amount: U256,
    pub ext_data_hash: B256,
    pub ext_data: WithdrawExtData,
    pub account: AccountUpdate,
}

/// Payload of `WITHDRAW_V2` jobs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolWithdrawPayload {
    pub proof: Bytes,
    /// the v2 pool address
    pub contract: Address,
    pub args: WithdrawArgs,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MiningRewardPayload {
    pub proof: Bytes,
    pub args: RewardArgs,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MiningWithdrawPayload {
    pub proof: Bytes,
    pub args: WithdrawArgs,
}

/// Payload of `BATCH_REWARD` jobs. `reward_args` holds the abi encoded
/// `(proof, args)` pairs sent on-chain, `args` their decoded form used for fee checks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchRewardPayload {
    pub reward_args: Vec<Bytes>,
    pub args: Vec<RewardArgs>,
}

/// A dequeued job with its payload decoded for its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayJob {
    Relay(InstanceWithdrawPayload),
    PoolWithdraw(InstanceWithdrawPayload),
    WithdrawV2(PoolWithdrawPayload),
    MiningReward(MiningRewardPayload),
    MiningWithdraw(MiningWithdrawPayload),
    BatchReward(BatchRewardPayload),
}

impl RelayJob {
    /// Decodes a payload for a known job kind
    pub fn from_parts(kind: JobKind, payload: serde_json::Value) -> Result<Self, JobError> {
        Ok(match kind {
            JobKind::Relay => RelayJob::Relay(decode(kind, payload)?),
            JobKind::PoolWithdraw => RelayJob::PoolWithdraw(decode(kind, payload)?),
            JobKind::WithdrawV2 => RelayJob::WithdrawV2(decode(kind, payload)?),
            JobKind::MiningReward => RelayJob::MiningReward(decode(kind, payload)?),
            JobKind::MiningWithdraw => RelayJob::MiningWithdraw(decode(kind, payload)?),
            JobKind::BatchReward => RelayJob::BatchReward(decode(kind, payload)?),
        })
    }

    pub fn kind(&self) -> JobKind {
        match self {
            RelayJob::Relay(_) => JobKind::Relay,
            RelayJob::PoolWithdraw(_) => JobKind::PoolWithdraw,
            RelayJob::WithdrawV2(_) => JobKind::WithdrawV2,
            RelayJob::MiningReward(_) => JobKind::MiningReward,
            RelayJob::MiningWithdraw(_) => JobKind::MiningWithdraw,
            RelayJob::BatchReward(_) => JobKind::BatchReward,
        }
    }

    pub fn is_tree_dependent(&self) -> bool {
        self.kind().is_tree_dependent()
    }

    /// The account transition a tree update can re-anchor. Batches carry no
    /// single account and are never regenerated.
    pub fn account(&self) -> Option<&AccountUpdate> {
        match self {
            RelayJob::MiningReward(payload) => Some(&payload.args.account),
            RelayJob::MiningWithdraw(payload) => Some(&payload.args.account),
            _ => None,
        }
    }
}

impl TryFrom<&JobRequest> for RelayJob {
    type Error = JobError;

    fn try_from(request: &JobRequest) -> Result<Self, Self::Error> {
        let kind =
            JobKind::from_str(&request.job_type).map_err(|_| JobError::UnknownJobType(request.job_type.clone()))?;
        RelayJob::from_parts(kind, request.payload.clone())
    }
}

fn decode<T: DeserializeOwned>(kind: JobKind, payload: serde_json::Value) -> Result<T, JobError> {
    serde_json::from_value(payload).map_err(|source| JobError::InvalidPayload { job_type: kind.to_string(), source })
}
