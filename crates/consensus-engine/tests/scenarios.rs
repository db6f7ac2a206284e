// consensus-engine/tests/scenarios.rs
//
// End-to-end scenarios driven entirely through `MockChainAdapter`, one per
// literal walkthrough: solo validator, matching attestor, diverging
// attestor, data arriving within the attestation window, data arriving
// after the cut-off, the exact cut-off boundary, subnet never activating,
// and an epoch rollover mid-poll for the validator.

use chain_adapter::MockChainAdapter;
use consensus_engine::ConsensusEngine;
use scoring_hook::UnitScoringHook;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subnet_tracker::{SubnetInfoTracker, TrackerConfig};
use subnet_types::{Classification, ConsensusData, Hotkey, NodeClass, NodeRecord, PeerId, ScoreEntry, SubnetState};

const SUBNET_ID: u64 = 1;

fn node(id: u64, class: NodeClass) -> NodeRecord {
    NodeRecord {
        subnet_node_id: id,
        peer_id: PeerId::new([id as u8; 32]),
        bootnode_peer_id: None,
        client_peer_id: None,
        hotkey: Hotkey::new([id as u8; 32]),
        classification: Classification::new(class, 0),
        stake_balance: 0,
        delegate_reward_rate: 0,
        penalties: 0,
        reputation: 0,
    }
}

/// Spins up a tracker over an already-active, already-populated mock.
fn spawn_tracker(mock: Arc<MockChainAdapter>) -> Arc<SubnetInfoTracker> {
    SubnetInfoTracker::spawn(
        mock,
        TrackerConfig {
            subnet_id: SUBNET_ID,
            updates_per_epoch: 0,
            block_secs: 0,
        },
    )
}

async fn wait_until<F: Fn() -> bool>(timeout: Duration, f: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if f() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Blocks until the tracker's per-epoch snapshot for `epoch` is populated,
/// so a test can rely on `nodes_v2[epoch]` being present before the engine
/// scores against it (the engine always scores epoch `E` off the peer set
/// of epoch `E - 1`).
async fn prime_epoch(tracker: &Arc<SubnetInfoTracker>, epoch: u64) {
    tokio::time::timeout(
        Duration::from_secs(2),
        tracker.get_nodes_on_epoch(epoch, NodeClass::Deactivated, None),
    )
    .await
    .expect("tracker never populated the requested epoch's node snapshot");
}

/// Starts every scenario at epoch 0 (so the tracker can snapshot a peer set
/// for it), primes that snapshot, then advances the mock to epoch 1 -- the
/// epoch the engine actually runs its validator/attestor role for, scoring
/// against the epoch-0 peer set it just primed.
async fn advance_to_epoch_one(mock: &Arc<MockChainAdapter>, tracker: &Arc<SubnetInfoTracker>) {
    prime_epoch(tracker, 0).await;
    mock.advance_epoch();
    mock.set_epoch_progress(0.0, 0.03);
}

fn fresh_active_mock(self_class: NodeClass) -> Arc<MockChainAdapter> {
    let mock = Arc::new(MockChainAdapter::new());
    mock.set_slot(Some(0));
    mock.set_epoch_length(1);
    mock.set_subnet_state(Some(SubnetState::Active));
    mock.set_epoch_progress(0.0, 0.03);
    mock.set_nodes(vec![node(1, self_class)]);
    mock
}

#[tokio::test]
async fn solo_validator_proposes_consensus_data() {
    let mock = fresh_active_mock(NodeClass::Validator);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 1);

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    assert!(wait_until(Duration::from_secs(2), || !mock.propose_calls().is_empty()).await);
    let calls = mock.propose_calls();
    assert_eq!(calls[0].0, SUBNET_ID);
    assert_eq!(calls[0].1, 1);

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn attestor_agrees_with_matching_validator_submission() {
    let mock = fresh_active_mock(NodeClass::Included);
    mock.set_nodes(vec![node(1, NodeClass::Included), node(2, NodeClass::Validator)]);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 2);
    mock.seed_consensus_data(
        1,
        ConsensusData::new(
            2,
            0.0,
            vec![
                ScoreEntry::new(1, subnet_types::UNIT_SCORE),
                ScoreEntry::new(2, subnet_types::UNIT_SCORE),
            ],
        ),
    );

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    assert!(wait_until(Duration::from_secs(2), || !mock.attest_calls().is_empty()).await);
    assert_eq!(mock.attest_calls()[0], (SUBNET_ID, 1, 1));

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn attestor_abstains_when_scores_diverge() {
    let mock = fresh_active_mock(NodeClass::Included);
    mock.set_nodes(vec![node(1, NodeClass::Included), node(2, NodeClass::Validator)]);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 2);
    // Validator published a score for a node our peer set doesn't have.
    mock.seed_consensus_data(1, ConsensusData::new(2, 0.0, vec![ScoreEntry::new(99, subnet_types::UNIT_SCORE)]));

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    // Give the engine a real chance to run, then confirm it never attested.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(mock.attest_calls().is_empty());

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn attestor_attests_when_data_arrives_within_window() {
    let mock = fresh_active_mock(NodeClass::Included);
    mock.set_nodes(vec![node(1, NodeClass::Included), node(2, NodeClass::Validator)]);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 2);

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(mock.attest_calls().is_empty(), "should not attest before data exists");

    mock.seed_consensus_data(
        1,
        ConsensusData::new(
            2,
            0.02,
            vec![
                ScoreEntry::new(1, subnet_types::UNIT_SCORE),
                ScoreEntry::new(2, subnet_types::UNIT_SCORE),
            ],
        ),
    );

    assert!(wait_until(Duration::from_secs(2), || !mock.attest_calls().is_empty()).await);

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn attestor_abstains_when_cutoff_passes_before_data_arrives() {
    let mock = fresh_active_mock(NodeClass::Included);
    mock.set_nodes(vec![node(1, NodeClass::Included), node(2, NodeClass::Validator)]);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 2);

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    // Push progress past the cut-off before the validator ever publishes.
    mock.set_epoch_progress(0.20, 0.01);
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Too late: the attestor should already have abstained and stopped
    // polling, so seeding data now must not trigger an attestation.
    mock.seed_consensus_data(
        1,
        ConsensusData::new(
            2,
            0.20,
            vec![
                ScoreEntry::new(1, subnet_types::UNIT_SCORE),
                ScoreEntry::new(2, subnet_types::UNIT_SCORE),
            ],
        ),
    );
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(mock.attest_calls().is_empty(), "attestor must abstain once percent_complete exceeds the cut-off");

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn attestor_attests_at_exact_cutoff_boundary() {
    let mock = fresh_active_mock(NodeClass::Included);
    mock.set_nodes(vec![node(1, NodeClass::Included), node(2, NodeClass::Validator)]);
    let tracker = spawn_tracker(mock.clone());
    advance_to_epoch_one(&mock, &tracker).await;
    mock.set_validator(1, 2);
    // Exactly at the cut-off: still strictly within the attestation window
    // (the engine abstains only when percent_complete > 0.15).
    mock.set_epoch_progress(0.15, 0.01);
    mock.seed_consensus_data(
        1,
        ConsensusData::new(
            2,
            0.15,
            vec![
                ScoreEntry::new(1, subnet_types::UNIT_SCORE),
                ScoreEntry::new(2, subnet_types::UNIT_SCORE),
            ],
        ),
    );

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    assert!(
        wait_until(Duration::from_secs(2), || !mock.attest_calls().is_empty()).await,
        "percent_complete == 0.15 must still be within the attest window"
    );
    assert_eq!(mock.attest_calls()[0], (SUBNET_ID, 1, 1));

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn engine_terminates_when_subnet_never_found() {
    let mock = Arc::new(MockChainAdapter::new());
    mock.set_slot(Some(0));
    mock.set_epoch_length(1);
    mock.advance_epoch();
    mock.set_epoch_progress(0.0, 0.02);
    mock.set_subnet_state(None);

    let tracker = spawn_tracker(mock.clone());

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        false,
        0,
    );

    let reason = tokio::time::timeout(Duration::from_secs(2), engine.run())
        .await
        .expect("engine should terminate rather than loop forever");

    assert_eq!(reason, consensus_engine::TerminationReason::SubnetNotFound);

    tracker.shutdown();
}

#[tokio::test]
async fn validator_poll_aborts_cleanly_on_epoch_rollover() {
    let mock = fresh_active_mock(NodeClass::Validator);
    mock.set_epoch_progress(0.0, 0.05);

    let tracker = spawn_tracker(mock.clone());
    prime_epoch(&tracker, 0).await;

    let engine = ConsensusEngine::new(
        SUBNET_ID,
        1,
        mock.clone(),
        tracker.clone(),
        Arc::new(UnitScoringHook),
        true,
        0,
    );
    let handle = tokio::spawn(engine.clone().run());

    tokio::time::sleep(Duration::from_millis(150)).await;
    mock.advance_epoch();
    // No validator ever set for epoch 1: the poll loop inside
    // `run_epoch_iteration` must notice the epoch has moved on and return
    // without ever calling `propose_attestation`.
    mock.set_validator(2, 99);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(mock.propose_calls().is_empty(), "epoch rolled over before a validator was elected");

    engine.shutdown();
    tracker.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}
