// subnet-types/src/node.rs

use crate::classification::{Classification, NodeClass};
use crate::ids::{Hotkey, PeerId};
use serde::{Deserialize, Serialize};

/// A subnet member as read from chain state.
///
/// `subnet_node_id` is immutable for the life of a registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub subnet_node_id: u64,
    pub peer_id: PeerId,
    pub bootnode_peer_id: Option<PeerId>,
    pub client_peer_id: Option<PeerId>,
    pub hotkey: Hotkey,
    pub classification: Classification,
    pub stake_balance: u128,
    pub delegate_reward_rate: u16,
    pub penalties: u32,
    pub reputation: i64,
}

impl NodeRecord {
    pub fn is_at_least(&self, min_class: NodeClass, epoch: u64) -> bool {
        self.classification.is_at_least(min_class, epoch)
    }

    /// Every peer identity this node might be observed under: its primary
    /// libp2p endpoint plus optional bootnode/client endpoints.
    pub fn peer_ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        std::iter::once(self.peer_id)
            .chain(self.bootnode_peer_id)
            .chain(self.client_peer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(class: NodeClass, start_epoch: u64) -> NodeRecord {
        NodeRecord {
            subnet_node_id: 1,
            peer_id: PeerId::new([1u8; 32]),
            bootnode_peer_id: None,
            client_peer_id: Some(PeerId::new([2u8; 32])),
            hotkey: Hotkey::new([3u8; 32]),
            classification: Classification::new(class, start_epoch),
            stake_balance: 0,
            delegate_reward_rate: 0,
            penalties: 0,
            reputation: 0,
        }
    }

    #[test]
    fn peer_ids_unions_primary_and_secondary() {
        let n = sample(NodeClass::Included, 0);
        let ids: Vec<_> = n.peer_ids().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], n.peer_id);
    }

    #[test]
    fn is_at_least_delegates_to_classification() {
        let n = sample(NodeClass::Idle, 5);
        assert!(!n.is_at_least(NodeClass::Included, 5));
        assert!(n.is_at_least(NodeClass::Idle, 5));
    }
}
