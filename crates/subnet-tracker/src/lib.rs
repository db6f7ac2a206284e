// subnet-tracker/src/lib.rs

//! A cached, background-refreshed view of subnet membership and epoch
//! timing, queryable synchronously from any component.
//!
//! The refresher runs on a dedicated OS thread (not a cooperative task) so
//! that its multi-second `get_all_nodes` call never stalls the consensus
//! engine's scheduler. The cache it publishes is the only shared mutable
//! state in the system; writes are brief and exclusive, reads are
//! unguarded snapshots.

mod cache;

use cache::Cache;
use chain_adapter::ChainAdapter;
use epoch_clock::{ChainClockSample, EpochClock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use subnet_types::{EpochData, NodeClass, NodeRecord, PeerId};

/// Tunables for the background refresher.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub subnet_id: u64,
    /// Up to `K` additional refreshes per epoch, beyond the mandatory
    /// boundary refresh.
    pub updates_per_epoch: u32,
    /// The chain's target block time, used to derive the sub-epoch
    /// refresh interval alongside the chain-reported `epoch_length`.
    pub block_secs: u64,
}

/// Cooperative polling granularity for `get_nodes_on_epoch` and the
/// refresher's cancellable sleeps.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct SubnetInfoTracker {
    adapter: Arc<dyn ChainAdapter>,
    config: TrackerConfig,
    cache: Arc<RwLock<Cache>>,
    shutdown: Arc<AtomicBool>,
    handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SubnetInfoTracker {
    /// Spawn the background refresher and return a handle to the tracker.
    pub fn spawn(adapter: Arc<dyn ChainAdapter>, config: TrackerConfig) -> Arc<Self> {
        let tracker = Arc::new(Self {
            adapter,
            config,
            cache: Arc::new(RwLock::new(Cache::default())),
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: std::sync::Mutex::new(None),
        });

        let worker = tracker.clone();
        let handle = std::thread::Builder::new()
            .name("subnet-info-tracker".into())
            .spawn(move || worker.run_blocking())
            .expect("failed to spawn subnet-info-tracker thread");

        *tracker.handle.lock().unwrap() = Some(handle);
        tracker
    }

    /// Cooperative shutdown: sets the flag observed by the refresher's
    /// sleeps and the poll loop in `get_nodes_on_epoch`. Does not wait for
    /// the thread to exit; call `join` for that.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn join(&self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    // ---- background thread body ----

    fn run_blocking(self: Arc<Self>) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build tracker runtime");
        rt.block_on(self.refresh_loop());
    }

    async fn refresh_loop(self: Arc<Self>) {
        tracing::info!(subnet_id = self.config.subnet_id, "subnet info tracker starting");

        let epoch_length = match self.adapter.get_epoch_length().await {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!("failed to fetch initial epoch length: {e}");
                0
            }
        };
        let interval = EpochClock::sub_epoch_interval(epoch_length, self.config.block_secs, self.config.updates_per_epoch);

        let mut last_epoch: Option<u64> = None;

        while !self.is_shutdown() {
            let slot = match self.resolve_slot().await {
                Some(slot) => slot,
                None => {
                    self.cancellable_sleep(Duration::from_secs(self.config.block_secs)).await;
                    continue;
                }
            };

            let epoch_data = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(data) => data,
                Err(_) => {
                    self.cancellable_sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            let current_epoch = epoch_data.epoch;

            if Some(current_epoch) != last_epoch {
                tracing::info!(epoch = current_epoch, "tracker observed new epoch");
                last_epoch = Some(current_epoch);

                self.full_refresh(slot).await;

                while !self.is_shutdown() {
                    let remaining = self.seconds_remaining_until_next_epoch();
                    if interval.as_secs_f64() > remaining {
                        break;
                    }
                    self.cancellable_sleep(interval).await;
                    if self.is_shutdown() {
                        break;
                    }
                    match self.adapter.get_subnet_epoch_data(slot).await {
                        Ok(fresh) if fresh.epoch == current_epoch => {
                            self.full_refresh(slot).await;
                        }
                        _ => break,
                    }
                }
            }

            let remaining = self.seconds_remaining_until_next_epoch().max(0.1);
            self.cancellable_sleep(Duration::from_secs_f64(remaining)).await;
        }

        tracing::info!("subnet info tracker stopped");
    }

    async fn resolve_slot(&self) -> Option<u64> {
        if let Some(slot) = self.cache.read().unwrap().slot {
            return Some(slot);
        }
        match self.adapter.get_subnet_slot(self.config.subnet_id).await {
            Ok(Some(slot)) => {
                self.cache.write().unwrap().slot = Some(slot);
                Some(slot)
            }
            _ => None,
        }
    }

    async fn full_refresh(&self, slot: u64) {
        self.update_epoch_data(slot).await;
        self.update_nodes().await;
        self.update_overwatch_nodes().await;
        self.update_bootnodes().await;
    }

    async fn update_epoch_data(&self, slot: u64) {
        match self.adapter.get_subnet_epoch_data(slot).await {
            Ok(data) => {
                let mut cache = self.cache.write().unwrap();
                cache.epoch_data = Some(data);
                cache.last_refresh = Some(Instant::now());
            }
            Err(e) => tracing::warn!("update_epoch_data failed: {e}"),
        }
    }

    async fn update_nodes(&self) {
        match self.adapter.get_all_nodes(self.config.subnet_id).await {
            Ok(nodes) => {
                let mut cache = self.cache.write().unwrap();
                let epoch = cache.epoch_data.map(|d| d.epoch);
                cache.nodes = Some(nodes.clone());
                if let Some(epoch) = epoch {
                    if !nodes.is_empty() {
                        cache.nodes_v2.insert(epoch, nodes);
                    }
                    cache.evict_stale(epoch);
                }
            }
            Err(e) => tracing::warn!("update_nodes failed: {e}"),
        }
    }

    async fn update_overwatch_nodes(&self) {
        match self.adapter.get_overwatch_nodes().await {
            Ok(nodes) => self.cache.write().unwrap().overwatch_nodes = Some(nodes),
            Err(e) => tracing::warn!("update_overwatch_nodes failed: {e}"),
        }
    }

    async fn update_bootnodes(&self) {
        match self.adapter.get_bootnodes(self.config.subnet_id).await {
            Ok(nodes) => self.cache.write().unwrap().bootnodes = Some(nodes),
            Err(e) => tracing::warn!("update_bootnodes failed: {e}"),
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Always awaits at least one chunk, even for a zero duration, so a
    /// tight retry loop can't spin the refresher thread without yielding.
    async fn cancellable_sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(remaining.min(POLL_INTERVAL)).await;
            if self.is_shutdown() || remaining.is_zero() {
                return;
            }
        }
    }

    // ---- query surface: non-blocking reads of cached state ----

    pub fn get_epoch_data(&self) -> Option<EpochData> {
        self.cache.read().unwrap().epoch_data
    }

    pub fn get_nodes(&self, min_class: NodeClass, start_epoch: Option<u64>) -> Vec<NodeRecord> {
        let cache = self.cache.read().unwrap();
        let Some(nodes) = cache.nodes.as_ref() else {
            return Vec::new();
        };
        let epoch = start_epoch.or_else(|| cache.epoch_data.map(|d| d.epoch)).unwrap_or(0);
        nodes.iter().filter(|n| n.is_at_least(min_class, epoch)).cloned().collect()
    }

    /// Blocks (cooperatively, in ≤1s increments) until `nodes_v2[epoch]`
    /// is populated or shutdown is signalled, then filters by class.
    pub async fn get_nodes_on_epoch(
        &self,
        epoch: u64,
        min_class: NodeClass,
        start_epoch: Option<u64>,
    ) -> Vec<NodeRecord> {
        loop {
            {
                let cache = self.cache.read().unwrap();
                if let Some(nodes) = cache.nodes_v2.get(&epoch) {
                    let gate = start_epoch.unwrap_or(epoch);
                    return nodes
                        .iter()
                        .filter(|n| n.is_at_least(min_class, gate))
                        .cloned()
                        .collect();
                }
            }
            if self.is_shutdown() {
                return Vec::new();
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    pub fn get_peer_id_node_id(&self, peer_id: PeerId) -> Option<u64> {
        let cache = self.cache.read().unwrap();
        cache
            .nodes
            .as_ref()?
            .iter()
            .find(|n| n.peer_ids().any(|id| id == peer_id))
            .map(|n| n.subnet_node_id)
    }

    /// Union of primary/bootnode/client peer ids across tracked nodes plus
    /// overwatch nodes.
    pub fn all_peer_ids(&self) -> HashSet<PeerId> {
        let cache = self.cache.read().unwrap();
        let mut ids = HashSet::new();
        if let Some(nodes) = cache.nodes.as_ref() {
            for node in nodes {
                ids.extend(node.peer_ids());
            }
        }
        if let Some(bootnodes) = cache.bootnodes.as_ref() {
            for node in bootnodes {
                ids.extend(node.peer_ids());
            }
        }
        if let Some(overwatch) = cache.overwatch_nodes.as_ref() {
            for node in overwatch {
                ids.extend(node.peer_ids());
            }
        }
        ids
    }

    /// `seconds_remaining` adjusted for drift since the last refresh.
    pub fn seconds_remaining_until_next_epoch(&self) -> f64 {
        let cache = self.cache.read().unwrap();
        let Some(epoch_data) = cache.epoch_data else {
            return self.config.block_secs as f64;
        };
        let elapsed = cache
            .last_refresh
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (epoch_data.seconds_remaining - elapsed).max(0.0)
    }
}

impl Drop for SubnetInfoTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
