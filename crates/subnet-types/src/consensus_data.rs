// subnet-types/src/consensus_data.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed-point score scale. The canonical unit score is `SCORE_SCALE`
/// itself (i.e. "full marks" for a peer is `1.0` at scale `1e18`).
pub const SCORE_SCALE: u128 = 1_000_000_000_000_000_000;
pub const UNIT_SCORE: u128 = SCORE_SCALE;

/// One entry of a score vector: a subnet node id and its fixed-point score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub subnet_node_id: u64,
    pub score: u128,
}

impl ScoreEntry {
    pub fn new(subnet_node_id: u64, score: u128) -> Self {
        Self {
            subnet_node_id,
            score,
        }
    }
}

/// The on-chain document published by the elected validator once per
/// epoch. At most one exists per `(subnet_id, epoch)`; further submission
/// attempts are rejected on-chain, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusData {
    pub validator_id: u64,
    pub validator_epoch_progress: f64,
    pub data: Vec<ScoreEntry>,
    pub attests: HashSet<u64>,
    pub subnet_nodes: Vec<u64>,
    pub prioritize_queue_node_id: Option<u64>,
    pub remove_queue_node_id: Option<u64>,
}

impl ConsensusData {
    pub fn new(validator_id: u64, validator_epoch_progress: f64, data: Vec<ScoreEntry>) -> Self {
        Self {
            validator_id,
            validator_epoch_progress,
            data,
            attests: HashSet::new(),
            subnet_nodes: Vec::new(),
            prioritize_queue_node_id: None,
            remove_queue_node_id: None,
        }
    }

    /// A node may attest at most once per epoch; duplicate attestations
    /// are a no-op, which this check lets callers short-circuit.
    pub fn has_attested(&self, subnet_node_id: u64) -> bool {
        self.attests.contains(&subnet_node_id)
    }
}

/// Result of a non-idempotent on-chain extrinsic (`propose_attestation`,
/// `attest`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub is_success: bool,
    pub error_message: Option<String>,
}

impl Receipt {
    pub fn success() -> Self {
        Self {
            is_success: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            error_message: Some(message.into()),
        }
    }
}
