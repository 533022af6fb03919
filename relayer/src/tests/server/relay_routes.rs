use std::net::SocketAddr;

use alloy::primitives::{B256, U256};
use rstest::*;
use serde_json::{json, Value};

use crate::server::types::{ApiResponse, EnqueueResponse, RelayerStatusResponse};
use crate::tests::common::{
    batch_reward_payload, eth_instance_address, instance_withdraw_payload, mining_reward_payload,
    mining_withdraw_payload, pool_withdraw_payload, relayer_address, GAS_PRICE_MINIMUM,
};
use crate::tests::config::{TestConfigBuilder, TestConfigBuilderReturns};
use crate::types::jobs::types::{JobKind, JobStatus};

#[fixture]
async fn setup_server() -> (SocketAddr, TestConfigBuilderReturns) {
    let services = TestConfigBuilder::new().configure_api_server().build().await;
    (services.api_server_address.unwrap(), services)
}

fn payload_for(kind: JobKind) -> Value {
    let fee = U256::from(1_000u64);
    let amount = U256::from(10_000u64);
    match kind {
        JobKind::Relay | JobKind::PoolWithdraw => {
            serde_json::to_value(instance_withdraw_payload(eth_instance_address(), fee, U256::ZERO))
        }
        JobKind::WithdrawV2 => serde_json::to_value(pool_withdraw_payload(amount, fee)),
        JobKind::MiningReward => serde_json::to_value(mining_reward_payload(fee, B256::ZERO)),
        JobKind::MiningWithdraw => serde_json::to_value(mining_withdraw_payload(amount, fee, B256::ZERO)),
        JobKind::BatchReward => serde_json::to_value(batch_reward_payload(&[fee, fee], B256::ZERO)),
    }
    .unwrap()
}

#[rstest]
#[case("/relay", JobKind::Relay)]
#[case("/v1/poolWithdraw", JobKind::PoolWithdraw)]
#[case("/v2/withdraw", JobKind::WithdrawV2)]
#[case("/v1/miningReward", JobKind::MiningReward)]
#[case("/v1/miningWithdraw", JobKind::MiningWithdraw)]
#[case("/v1/batchReward", JobKind::BatchReward)]
#[tokio::test]
async fn relay_routes_enqueue_their_job_type(
    #[future] setup_server: (SocketAddr, TestConfigBuilderReturns),
    #[case] route: &str,
    #[case] kind: JobKind,
) {
    let (addr, services) = setup_server.await;
    let payload = payload_for(kind);

    let response =
        reqwest::Client::new().post(format!("http://{}{}", addr, route)).json(&payload).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: EnqueueResponse = response.json().await.unwrap();
    let job = services.config.queue().get_job(body.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.request.job_type, kind.to_string());
    assert_eq!(job.request.payload, payload);
}

#[rstest]
#[tokio::test]
async fn malformed_payload_is_refused(#[future] setup_server: (SocketAddr, TestConfigBuilderReturns)) {
    let (addr, services) = setup_server.await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/v1/miningReward", addr))
        .json(&json!({ "proof": "0x00" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(body.message.unwrap().starts_with("Invalid payload for MINING_REWARD job"));
    assert_eq!(services.config.queue().queued_count().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn status_reports_settings_and_queue(#[future] setup_server: (SocketAddr, TestConfigBuilderReturns)) {
    let (addr, services) = setup_server.await;
    let client = reqwest::Client::new();
    client.post(format!("http://{}/relay", addr)).json(&payload_for(JobKind::Relay)).send().await.unwrap();

    let response = client.get(format!("http://{}/v1/status", addr)).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let status: RelayerStatusResponse = response.json().await.unwrap();
    assert_eq!(status.reward_account, relayer_address());
    assert_eq!(status.service_fee, "0.05");
    assert_eq!(status.mining_service_fee, "0.05");
    assert_eq!(status.gas_price_minimum, Some(GAS_PRICE_MINIMUM.to_string()));
    assert_eq!(status.current_queue, 1);
    assert_eq!(status.version, env!("CARGO_PKG_VERSION"));

    services.server_handle.unwrap().shutdown().await.unwrap();
}

#[rstest]
#[tokio::test]
async fn unknown_route_is_not_found(#[future] setup_server: (SocketAddr, TestConfigBuilderReturns)) {
    let (addr, _services) = setup_server.await;
    let response = reqwest::Client::new().get(format!("http://{}/v3/unknown", addr)).send().await.unwrap();
    assert_eq!(response.status(), 404);
}
