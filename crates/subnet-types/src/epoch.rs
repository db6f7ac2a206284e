// subnet-types/src/epoch.rs

use serde::{Deserialize, Serialize};

/// Derived timing for a single epoch: the contiguous block range
/// `[start, start + epoch_length)` reduced to the four quantities every
/// caller actually needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochData {
    pub epoch: u64,
    pub blocks_remaining: u64,
    pub seconds_remaining: f64,
    pub percent_complete: f64,
}

impl EpochData {
    pub fn new(epoch: u64, blocks_remaining: u64, seconds_remaining: f64, percent_complete: f64) -> Self {
        Self {
            epoch,
            blocks_remaining,
            seconds_remaining,
            percent_complete,
        }
    }
}

/// Subnet activation state as tracked on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubnetState {
    Registered,
    Active,
    Deactivated,
}

/// Subnet-level info, queried once per epoch during activation (S0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub state: SubnetState,
}
