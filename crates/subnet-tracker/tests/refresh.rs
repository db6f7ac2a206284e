// subnet-tracker/tests/refresh.rs

use chain_adapter::MockChainAdapter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subnet_tracker::{SubnetInfoTracker, TrackerConfig};
use subnet_types::{Classification, Hotkey, NodeClass, NodeRecord, PeerId};

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

async fn wait_until<F: Fn() -> bool>(timeout: Duration, f: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if f() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn tracker_publishes_epoch_data_and_nodes() {
    let mock = Arc::new(MockChainAdapter::new());
    mock.set_slot(Some(0));
    mock.set_epoch_length(1);
    mock.advance_epoch();
    mock.set_nodes(vec![node(1, NodeClass::Idle), node(2, NodeClass::Included)]);

    let tracker = SubnetInfoTracker::spawn(
        mock,
        TrackerConfig {
            subnet_id: 1,
            updates_per_epoch: 0,
            block_secs: 0,
        },
    );

    let ready = wait_until(Duration::from_secs(2), || tracker.get_epoch_data().is_some()).await;
    assert!(ready, "tracker never published epoch data");

    let nodes = tracker.get_nodes(NodeClass::Included, None);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].subnet_node_id, 2);

    tracker.shutdown();
}

#[tokio::test]
async fn get_nodes_on_epoch_waits_for_population() {
    let mock = Arc::new(MockChainAdapter::new());
    mock.set_slot(Some(0));
    mock.set_epoch_length(1);
    mock.advance_epoch();
    mock.set_nodes(vec![node(7, NodeClass::Validator)]);

    let tracker = SubnetInfoTracker::spawn(
        mock,
        TrackerConfig {
            subnet_id: 1,
            updates_per_epoch: 0,
            block_secs: 0,
        },
    );

    let epoch = wait_until(Duration::from_secs(2), || tracker.get_epoch_data().is_some()).await;
    assert!(epoch);
    let current_epoch = tracker.get_epoch_data().unwrap().epoch;

    let nodes = tokio::time::timeout(
        Duration::from_secs(2),
        tracker.get_nodes_on_epoch(current_epoch, NodeClass::Validator, None),
    )
    .await
    .expect("get_nodes_on_epoch timed out");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].subnet_node_id, 7);

    tracker.shutdown();
}
