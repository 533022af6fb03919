use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Stored by the queue, waiting for the worker
    Queued,
    /// Picked up by the worker
    Accepted,
    /// A transaction for the job has been broadcast
    Sent,
    /// A receipt for the job's transaction exists, successful or not
    Mined,
    /// The mined transaction reverted on a stale root and the job is being retried
    Resubmitted,
    /// The transaction succeeded. Terminal.
    Confirmed,
    /// The job failed, see `failure_reason`. Terminal.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Confirmed | JobStatus::Failed)
    }

    /// Statuses a job only holds while the worker owns it
    pub const IN_FLIGHT: [JobStatus; 4] =
        [JobStatus::Accepted, JobStatus::Sent, JobStatus::Mined, JobStatus::Resubmitted];

    pub fn is_in_flight(&self) -> bool {
        Self::IN_FLIGHT.contains(self)
    }
}

/// Closed set of relay job kinds, identified on the wire by their SCREAMING_SNAKE_CASE name
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    /// Withdrawal sent straight to a v1 instance
    Relay,
    /// v1 withdrawal routed through the proxy
    PoolWithdraw,
    /// Withdrawal from a v2 pool
    WithdrawV2,
    MiningReward,
    MiningWithdraw,
    BatchReward,
}

impl JobKind {
    /// Job kinds whose proofs reference the account tree root
    pub fn is_tree_dependent(&self) -> bool {
        matches!(self, JobKind::MiningReward | JobKind::MiningWithdraw | JobKind::BatchReward)
    }
}
