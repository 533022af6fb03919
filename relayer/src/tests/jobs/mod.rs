use std::str::FromStr;

use alloy::primitives::{B256, U256};
use assert_matches::assert_matches;
use rstest::*;

use crate::error::job::JobError;
use crate::tests::common::{eth_instance_address, instance_withdraw_payload, job_request, mining_reward_payload};
use crate::types::jobs::job_item::JobRequest;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::payload::RelayJob;
use crate::types::jobs::types::{JobKind, JobStatus};

#[rstest]
fn empty_update_does_not_build() {
    assert_matches!(JobItemUpdates::new().build(), Err(JobError::Other(_)));
    assert!(JobItemUpdates::new().update_confirmations(0).build().is_ok());
}

#[rstest]
#[case("RELAY", JobKind::Relay, false)]
#[case("POOL_WITHDRAW", JobKind::PoolWithdraw, false)]
#[case("WITHDRAW_V2", JobKind::WithdrawV2, false)]
#[case("MINING_REWARD", JobKind::MiningReward, true)]
#[case("MINING_WITHDRAW", JobKind::MiningWithdraw, true)]
#[case("BATCH_REWARD", JobKind::BatchReward, true)]
fn job_kinds_round_trip_their_wire_name(#[case] name: &str, #[case] kind: JobKind, #[case] tree_dependent: bool) {
    assert_eq!(JobKind::from_str(name).unwrap(), kind);
    assert_eq!(kind.to_string(), name);
    assert_eq!(kind.is_tree_dependent(), tree_dependent);
}

#[rstest]
#[case(JobStatus::Confirmed, true)]
#[case(JobStatus::Failed, true)]
#[case(JobStatus::Resubmitted, false)]
#[case(JobStatus::Queued, false)]
fn only_confirmed_and_failed_are_terminal(#[case] status: JobStatus, #[case] terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[rstest]
fn status_is_serialized_in_screaming_case() {
    assert_eq!(serde_json::to_value(JobStatus::Resubmitted).unwrap(), "RESUBMITTED");
}

#[rstest]
fn request_decodes_into_its_variant() {
    let payload = mining_reward_payload(U256::from(5), B256::repeat_byte(0x09));
    let job = RelayJob::try_from(&job_request(JobKind::MiningReward, &payload)).unwrap();

    assert_eq!(job.kind(), JobKind::MiningReward);
    assert!(job.is_tree_dependent());
    assert_eq!(job.account().unwrap().input_root, B256::repeat_byte(0x09));
    assert_matches!(job, RelayJob::MiningReward(decoded) if decoded == payload);
}

#[rstest]
fn instance_args_are_positional() {
    let payload = instance_withdraw_payload(eth_instance_address(), U256::from(7), U256::from(3));
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["args"].as_array().unwrap().len(), 6);

    let job = RelayJob::try_from(&job_request(JobKind::Relay, &payload)).unwrap();
    assert_matches!(job, RelayJob::Relay(decoded) => {
        assert_eq!(decoded.args.fee(), U256::from(7));
        assert_eq!(decoded.args.refund(), U256::from(3));
    });
}

#[rstest]
fn unknown_type_is_reported() {
    let request = JobRequest { job_type: "SWAP".to_string(), payload: serde_json::json!({}) };
    let err = RelayJob::try_from(&request).unwrap_err();
    assert_eq!(err.to_string(), "Unknown job type: SWAP");
}

#[rstest]
fn payload_of_the_wrong_shape_is_reported() {
    let payload = instance_withdraw_payload(eth_instance_address(), U256::from(7), U256::from(3));
    let err = RelayJob::try_from(&job_request(JobKind::MiningWithdraw, &payload)).unwrap_err();
    assert_matches!(err, JobError::InvalidPayload { ref job_type, .. } if job_type == "MINING_WITHDRAW");
}
