// subnet-tracker/src/cache.rs

use std::collections::HashMap;
use std::time::Instant;
use subnet_types::{EpochData, NodeRecord};

/// The tracker's cached view. Owner-written by the refresher thread,
/// multi-reader from the cooperative engine task; readers accept eventual
/// consistency and never block a writer.
#[derive(Debug, Default)]
pub(crate) struct Cache {
    pub slot: Option<u64>,
    pub epoch_data: Option<EpochData>,
    pub last_refresh: Option<Instant>,
    pub nodes: Option<Vec<NodeRecord>>,
    /// Per-epoch snapshots. Entries older than `current_epoch - 1` are
    /// evicted after every refresh.
    pub nodes_v2: HashMap<u64, Vec<NodeRecord>>,
    pub bootnodes: Option<Vec<NodeRecord>>,
    pub overwatch_nodes: Option<Vec<NodeRecord>>,
}

impl Cache {
    /// Drop any per-epoch snapshot older than `current_epoch - 1`.
    pub fn evict_stale(&mut self, current_epoch: u64) {
        let floor = current_epoch.saturating_sub(1);
        self.nodes_v2.retain(|&epoch, _| epoch >= floor);
    }
}
