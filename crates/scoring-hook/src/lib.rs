// scoring-hook/src/lib.rs

//! The scoring hook: a pure, injected function from `(epoch, peer_set)` to
//! a score vector. Determinism across honest nodes is its entire contract
//! -- the engine treats it as total (no exceptions surface; an empty
//! vector is a legal result) and never inspects how scores were derived.

use subnet_types::{NodeClass, NodeRecord, ScoreEntry, UNIT_SCORE};

/// Implementors must be deterministic: identical `(epoch, peer_set)`
/// inputs must yield an identical `Vec<ScoreEntry>` (as a multiset) on
/// every honest node, since the engine never tolerates near-misses when
/// comparing a validator's submission to a locally computed vector.
pub trait ScoringHook: Send + Sync {
    fn score(&self, epoch: u64, peer_set: &[NodeRecord]) -> Vec<ScoreEntry>;
}

/// Default placeholder: unit score for every Included-class peer in the
/// supplied set. Real subnets inject their own hook; this one exists so
/// the engine is runnable without a scoring implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitScoringHook;

impl ScoringHook for UnitScoringHook {
    fn score(&self, epoch: u64, peer_set: &[NodeRecord]) -> Vec<ScoreEntry> {
        peer_set
            .iter()
            .filter(|n| n.is_at_least(NodeClass::Included, epoch))
            .map(|n| ScoreEntry::new(n.subnet_node_id, UNIT_SCORE))
            .collect()
    }
}
