use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{B256, U256};
use alloy::sol_types::SolCall;
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::client::PendingTransaction;
use crate::core::contracts::Miner;
use crate::tests::common::fakes::{FakePendingTransaction, FakeTreeStore, RecordingProofEngine};
use crate::tests::common::{
    batch_reward_payload, chain_params, eth_instance_address, instance_withdraw_payload, job_request,
    mining_reward_payload, tree_json, tree_root,
};
use crate::tests::config::{build_worker, TestConfigBuilder, TestConfigBuilderReturns};
use crate::types::jobs::payload::RelayJob;
use crate::types::jobs::types::JobKind;
use crate::worker::call::build_call;
use crate::worker::state::{ActiveJob, SharedWorkerState};

const LEAVES: [u64; 3] = [1, 2, 3];

/// Registers `job` as the active job with a broadcast in flight
async fn activate(
    services: &TestConfigBuilderReturns,
    state: &SharedWorkerState,
    job: RelayJob,
) -> Arc<FakePendingTransaction> {
    let request = match &job {
        RelayJob::MiningReward(payload) => job_request(JobKind::MiningReward, payload),
        RelayJob::BatchReward(payload) => job_request(JobKind::BatchReward, payload),
        RelayJob::Relay(payload) => job_request(JobKind::Relay, payload),
        _ => unreachable!(),
    };
    let item = services.config.queue().enqueue(request).await.unwrap();
    let pending = Arc::new(FakePendingTransaction::new(7, true, None));

    let mut active = ActiveJob::new(item, job.clone());
    active.pending = Some(pending.clone());
    active.call = Some(build_call(&job, services.config.chain_params(), None));
    state.lock().await.active = Some(active);
    pending
}

#[rstest]
#[tokio::test]
async fn prime_loads_the_snapshot() {
    let services =
        TestConfigBuilder::new().configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES)))).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());

    synchronizer.prime().await.unwrap();

    let tree = state.lock().await.tree.clone().unwrap();
    assert_eq!(tree.root_bytes(), tree_root(&LEAVES));
    assert_eq!(tree.leaves().len(), 3);
}

#[rstest]
#[tokio::test]
async fn prime_fails_without_snapshot() {
    let services = TestConfigBuilder::new().build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());

    assert!(synchronizer.prime().await.is_err());
    assert!(state.lock().await.tree.is_none());
}

#[rstest]
#[tokio::test]
async fn advance_without_active_job_only_refreshes_the_tree() {
    let tree_store = FakeTreeStore::new(Some(tree_json(&LEAVES)));
    let services = TestConfigBuilder::new().configure_tree_store(tree_store).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());

    synchronizer.on_tree_advanced().await;

    assert_eq!(state.lock().await.tree.as_ref().unwrap().root_bytes(), tree_root(&LEAVES));
    assert!(services.proofs.commitments().is_empty());
}

#[rstest]
#[tokio::test]
async fn current_root_is_a_no_op() {
    let services =
        TestConfigBuilder::new().configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES)))).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&LEAVES)));
    let pending = activate(&services, &state, job).await;

    synchronizer.on_tree_advanced().await;

    assert!(services.proofs.commitments().is_empty());
    assert!(pending.replacements().is_empty());
}

#[rstest]
#[tokio::test]
async fn stale_root_replaces_the_pending_transaction_in_place() {
    let services =
        TestConfigBuilder::new().configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES)))).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&[1, 2])));
    let pending = activate(&services, &state, job).await;
    let original_hash = pending.tx_hash().await;

    synchronizer.on_tree_advanced().await;

    assert_eq!(services.proofs.commitments(), vec![B256::repeat_byte(0x33)]);
    let replacements = pending.replacements();
    assert_eq!(replacements.len(), 1);
    assert_eq!(pending.nonce(), 7);
    let call = Miner::reward_1Call::abi_decode(&replacements[0].data).unwrap();
    assert_eq!(call.treeUpdateArgs.newRoot, tree_root(&LEAVES));

    let state = state.lock().await;
    let active = state.active.as_ref().unwrap();
    assert_eq!(active.call.as_ref(), Some(&replacements[0]));
    let new_hash = pending.tx_hash().await;
    assert_ne!(new_hash, original_hash);
    assert_eq!(active.item.tx_hash, Some(new_hash));

    let stored = services.config.queue().get_job(active.item.id).await.unwrap().unwrap();
    assert_eq!(stored.tx_hash, Some(new_hash));
}

#[rstest]
#[tokio::test]
async fn tree_independent_and_batch_jobs_are_never_regenerated() {
    let services =
        TestConfigBuilder::new().configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES)))).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());

    let relay = RelayJob::Relay(instance_withdraw_payload(eth_instance_address(), U256::from(1), U256::ZERO));
    let pending = activate(&services, &state, relay).await;
    synchronizer.on_tree_advanced().await;
    assert!(pending.replacements().is_empty());

    state.lock().await.tree = None;
    let batch = RelayJob::BatchReward(batch_reward_payload(&[U256::from(1)], tree_root(&[1])));
    let pending = activate(&services, &state, batch).await;
    synchronizer.on_tree_advanced().await;
    assert!(pending.replacements().is_empty());

    assert!(services.proofs.commitments().is_empty());
}

#[rstest]
#[tokio::test]
async fn prover_failure_leaves_the_pending_transaction_alone() {
    let services = TestConfigBuilder::new()
        .configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES))))
        .configure_proofs(RecordingProofEngine::failing())
        .build()
        .await;
    let (_, synchronizer, state) = build_worker(services.config.clone());
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&[1])));
    let pending = activate(&services, &state, job).await;

    synchronizer.on_tree_advanced().await;

    assert_eq!(services.proofs.commitments().len(), 1);
    assert!(pending.replacements().is_empty());
    // the tree is kept back so the next signal retries
    assert!(state.lock().await.tree.is_none());
    synchronizer.on_tree_advanced().await;
    assert_eq!(services.proofs.commitments().len(), 2);
}

#[rstest]
#[tokio::test]
async fn regenerated_call_targets_the_miner() {
    let services =
        TestConfigBuilder::new().configure_tree_store(FakeTreeStore::new(Some(tree_json(&LEAVES)))).build().await;
    let (_, synchronizer, _) = build_worker(services.config.clone());
    let snapshot = synchronizer.load_snapshot().await.unwrap();
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&[1])));

    let call = synchronizer.regenerate_call(&job, &snapshot).await.unwrap().unwrap();

    assert_eq!(call.to, chain_params().miner_address);
    assert_eq!(&call.data[..4], Miner::reward_1Call::SELECTOR.as_slice());
}

#[rstest]
#[tokio::test]
async fn notifications_drive_the_synchronizer_task() {
    let tree_store = FakeTreeStore::new(Some(tree_json(&[1])));
    let services = TestConfigBuilder::new().configure_tree_store(tree_store.clone()).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&[1])));
    let pending = activate(&services, &state, job).await;

    let cancel = CancellationToken::new();
    let handles = synchronizer.clone().spawn(cancel.clone()).await.unwrap();

    tree_store.set(tree_json(&LEAVES));
    for _ in 0..3 {
        tree_store.advance();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while pending.replacements().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Pending transaction was not replaced");

    cancel.cancel();
    for handle in handles {
        handle.await.unwrap();
    }

    // later signals of the burst find the tree unchanged
    assert_eq!(pending.replacements().len(), 1);
    assert_eq!(state.lock().await.tree.as_ref().unwrap().root_bytes(), tree_root(&LEAVES));
}

#[rstest]
#[tokio::test]
async fn listener_resubscribes_after_the_subscription_ends() {
    let tree_store = FakeTreeStore::new(Some(tree_json(&[1])));
    let services = TestConfigBuilder::new().configure_tree_store(tree_store.clone()).build().await;
    let (_, synchronizer, state) = build_worker(services.config.clone());
    let job = RelayJob::MiningReward(mining_reward_payload(U256::from(1), tree_root(&[1])));
    let pending = activate(&services, &state, job).await;

    let cancel = CancellationToken::new();
    let handles = synchronizer.clone().spawn(cancel.clone()).await.unwrap();
    assert_eq!(tree_store.subscriptions(), 1);

    tree_store.close_subscription();
    tokio::time::timeout(Duration::from_secs(5), async {
        while tree_store.subscriptions() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Listener did not resubscribe");

    tree_store.set(tree_json(&LEAVES));
    tree_store.advance();

    tokio::time::timeout(Duration::from_secs(5), async {
        while pending.replacements().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Notification after resubscribing was not handled");

    cancel.cancel();
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(pending.replacements().len(), 1);
}
