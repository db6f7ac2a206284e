// consensus-engine/src/lib.rs

//! The four-state consensus lifecycle (S0 Activating, S1
//! AwaitingEligibility, S2 Running, S3 Terminated) that drives a single
//! subnet node: wait for subnet activation, wait for this node's own
//! eligibility, then loop per-epoch as elected validator or attestor.

mod compare;
mod engine;
mod state;

pub use compare::scores_match;
pub use engine::{ConsensusEngine, ATTESTOR_CUTOFF_PERCENT};
pub use state::{EnginePhase, TerminationReason};
