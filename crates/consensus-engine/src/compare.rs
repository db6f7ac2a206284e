// consensus-engine/src/compare.rs

//! Multiset comparison between a locally computed score vector and the
//! vector a validator published on-chain. Order never carries meaning;
//! two vectors match iff they contain the same `(subnet_node_id, score)`
//! pairs with the same multiplicities, and the comparison is exact -- no
//! epsilon tolerance on the fixed-point score.

use std::collections::HashMap;
use subnet_types::ScoreEntry;

/// True iff `ours` and `theirs` are the same multiset of score entries.
pub fn scores_match(ours: &[ScoreEntry], theirs: &[ScoreEntry]) -> bool {
    if ours.len() != theirs.len() {
        return false;
    }
    tally(ours) == tally(theirs)
}

fn tally(entries: &[ScoreEntry]) -> HashMap<(u64, u128), usize> {
    let mut counts = HashMap::new();
    for e in entries {
        *counts.entry((e.subnet_node_id, e.score)).or_insert(0usize) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, score: u128) -> ScoreEntry {
        ScoreEntry::new(id, score)
    }

    #[test]
    fn identical_vectors_match() {
        let a = vec![entry(1, 10), entry(2, 20)];
        assert!(scores_match(&a, &a));
    }

    #[test]
    fn order_is_irrelevant() {
        let a = vec![entry(1, 10), entry(2, 20)];
        let b = vec![entry(2, 20), entry(1, 10)];
        assert!(scores_match(&a, &b));
    }

    #[test]
    fn differing_score_breaks_match() {
        let a = vec![entry(1, 10)];
        let b = vec![entry(1, 11)];
        assert!(!scores_match(&a, &b));
    }

    #[test]
    fn differing_length_breaks_match() {
        let a = vec![entry(1, 10)];
        let b = vec![entry(1, 10), entry(2, 10)];
        assert!(!scores_match(&a, &b));
    }

    #[test]
    fn duplicate_entries_require_matching_multiplicity() {
        let a = vec![entry(1, 10), entry(1, 10)];
        let b = vec![entry(1, 10), entry(1, 10)];
        let c = vec![entry(1, 10), entry(2, 10)];
        assert!(scores_match(&a, &b));
        assert!(!scores_match(&a, &c));
    }

    #[test]
    fn empty_vectors_match() {
        assert!(scores_match(&[], &[]));
    }
}
