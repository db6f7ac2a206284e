// subnet-types/src/lib.rs

//! Shared domain types for the epoch-driven subnet consensus engine.
//!
//! This crate provides:
//! - Node identities and classification lattice
//! - Epoch timing and subnet activation state
//! - The on-chain consensus-data record and score vectors

pub mod classification;
pub mod consensus_data;
pub mod epoch;
pub mod ids;
pub mod node;

pub use classification::{Classification, NodeClass};
pub use consensus_data::{ConsensusData, Receipt, ScoreEntry, SCORE_SCALE, UNIT_SCORE};
pub use epoch::{EpochData, SubnetInfo, SubnetState};
pub use ids::{Hotkey, IdParseError, PeerId};
pub use node::NodeRecord;
