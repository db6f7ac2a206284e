// consensus-engine/src/engine.rs

use crate::compare::scores_match;
use crate::state::{EnginePhase, TerminationReason};
use chain_adapter::{ChainAdapter, ChainError};
use scoring_hook::ScoringHook;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use subnet_tracker::SubnetInfoTracker;
use subnet_types::{NodeClass, SubnetState};

/// Cut-off, as a fraction of epoch progress, past which an attestor gives
/// up waiting for the validator's submission and abstains for the epoch.
/// Kept as a named constant rather than made configurable, since subnets
/// share one attestation window by construction.
pub const ATTESTOR_CUTOFF_PERCENT: f64 = 0.15;

/// Retries of `get_subnet_info` returning `None` tolerated during S0
/// before the engine gives up and terminates.
const MAX_SUBNET_NOT_FOUND_RETRIES: u32 = 3;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn phase_to_u8(phase: EnginePhase) -> u8 {
    match phase {
        EnginePhase::Activating => 0,
        EnginePhase::AwaitingEligibility => 1,
        EnginePhase::Running => 2,
        EnginePhase::Terminated => 3,
    }
}

/// Drives one subnet node through the four-state consensus lifecycle:
/// activation (S0), eligibility (S1), the steady-state per-epoch
/// validator/attestor loop (S2), and shutdown (S3).
///
/// Every chain call here goes straight to the `ChainAdapter`; only the
/// per-epoch peer set for scoring is read from the `SubnetInfoTracker`'s
/// cache, since that is the one value the tracker can hold pinned to a
/// specific past epoch without a racing refresh invalidating it.
pub struct ConsensusEngine {
    subnet_id: u64,
    subnet_node_id: u64,
    adapter: Arc<dyn ChainAdapter>,
    tracker: Arc<SubnetInfoTracker>,
    scoring: Arc<dyn ScoringHook>,
    skip_activate_subnet: bool,
    block_secs: u64,
    slot: Mutex<Option<u64>>,
    shutdown: Arc<AtomicBool>,
    phase: AtomicU8,
}

impl ConsensusEngine {
    pub fn new(
        subnet_id: u64,
        subnet_node_id: u64,
        adapter: Arc<dyn ChainAdapter>,
        tracker: Arc<SubnetInfoTracker>,
        scoring: Arc<dyn ScoringHook>,
        skip_activate_subnet: bool,
        block_secs: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            subnet_id,
            subnet_node_id,
            adapter,
            tracker,
            scoring,
            skip_activate_subnet,
            block_secs,
            slot: Mutex::new(None),
            shutdown: Arc::new(AtomicBool::new(false)),
            phase: AtomicU8::new(phase_to_u8(EnginePhase::Activating)),
        })
    }

    /// Cooperative shutdown: observed at the top of every wait loop and by
    /// every cancellable sleep. Does not itself stop the tracker; callers
    /// own that.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn phase(&self) -> EnginePhase {
        match self.phase.load(Ordering::SeqCst) {
            0 => EnginePhase::Activating,
            1 => EnginePhase::AwaitingEligibility,
            2 => EnginePhase::Running,
            _ => EnginePhase::Terminated,
        }
    }

    fn set_phase(&self, phase: EnginePhase) {
        self.phase.store(phase_to_u8(phase), Ordering::SeqCst);
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sleeps in `POLL_INTERVAL` chunks so shutdown is observed promptly.
    /// Always awaits at least one chunk, even for a zero duration, so a
    /// tight retry loop (e.g. polling for a validator with `block_secs ==
    /// 0` in tests) still yields to the runtime instead of spinning.
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

    /// Runs the full lifecycle to completion, returning why it terminated.
    /// Consumes nothing; callers keep their `Arc<ConsensusEngine>` to call
    /// `shutdown()` concurrently from elsewhere (e.g. a ctrl-c handler).
    pub async fn run(self: Arc<Self>) -> TerminationReason {
        if self.is_shutdown() {
            self.set_phase(EnginePhase::Terminated);
            return TerminationReason::Shutdown;
        }

        if !self.skip_activate_subnet {
            if let Some(reason) = self.run_activating().await {
                self.set_phase(EnginePhase::Terminated);
                return reason;
            }
        }

        if let Some(reason) = self.run_awaiting_eligibility().await {
            self.set_phase(EnginePhase::Terminated);
            return reason;
        }

        let reason = self.run_forever().await;
        self.set_phase(EnginePhase::Terminated);
        reason
    }

    /// Resolves and caches the subnet's chain slot, retrying indefinitely
    /// (subject to shutdown) until one is reported.
    async fn resolve_slot(&self) -> Option<u64> {
        loop {
            if let Some(slot) = *self.slot.lock().unwrap() {
                return Some(slot);
            }
            if self.is_shutdown() {
                return None;
            }
            match self.adapter.get_subnet_slot(self.subnet_id).await {
                Ok(Some(slot)) => {
                    *self.slot.lock().unwrap() = Some(slot);
                    return Some(slot);
                }
                _ => self.cancellable_sleep(Duration::from_secs(self.block_secs)).await,
            }
        }
    }

    // ---- S0: Activating ----

    async fn run_activating(&self) -> Option<TerminationReason> {
        self.set_phase(EnginePhase::Activating);
        tracing::info!(subnet_id = self.subnet_id, "waiting for subnet activation");

        let mut not_found_streak = 0u32;

        loop {
            if self.is_shutdown() {
                return Some(TerminationReason::Shutdown);
            }

            let Some(slot) = self.resolve_slot().await else {
                return Some(TerminationReason::Shutdown);
            };

            let epoch_data = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(data) => data,
                Err(_) => {
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
            };

            match self.adapter.get_subnet_info(self.subnet_id).await {
                Ok(Some(info)) if info.state == SubnetState::Active => {
                    tracing::info!(subnet_id = self.subnet_id, "subnet active");
                    return None;
                }
                Ok(Some(_)) => {
                    not_found_streak = 0;
                }
                Ok(None) => {
                    not_found_streak += 1;
                    if not_found_streak > MAX_SUBNET_NOT_FOUND_RETRIES {
                        tracing::warn!(
                            subnet_id = self.subnet_id,
                            "subnet not found after {MAX_SUBNET_NOT_FOUND_RETRIES} retries, giving up"
                        );
                        return Some(TerminationReason::SubnetNotFound);
                    }
                }
                Err(ChainError::NotFound) => {
                    not_found_streak += 1;
                    if not_found_streak > MAX_SUBNET_NOT_FOUND_RETRIES {
                        return Some(TerminationReason::SubnetNotFound);
                    }
                }
                Err(e) => {
                    tracing::warn!("get_subnet_info failed: {e}");
                }
            }

            // Every retry path falls through to this sleep: no fast-path
            // skips waiting for the next epoch boundary, so activation
            // polling never busy-loops.
            self.cancellable_sleep(Duration::from_secs_f64(epoch_data.seconds_remaining.max(0.1)))
                .await;
        }
    }

    // ---- S1: AwaitingEligibility ----

    async fn run_awaiting_eligibility(&self) -> Option<TerminationReason> {
        self.set_phase(EnginePhase::AwaitingEligibility);
        tracing::info!(subnet_node_id = self.subnet_node_id, "waiting for eligibility");

        loop {
            if self.is_shutdown() {
                return Some(TerminationReason::Shutdown);
            }

            let Some(slot) = self.resolve_slot().await else {
                return Some(TerminationReason::Shutdown);
            };

            let epoch_data = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(data) => data,
                Err(_) => {
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
            };

            match self
                .adapter
                .get_nodes_by_min_class(self.subnet_id, epoch_data.epoch, NodeClass::Idle)
                .await
            {
                Ok(nodes) => {
                    if nodes.iter().any(|n| n.subnet_node_id == self.subnet_node_id) {
                        tracing::info!(
                            subnet_node_id = self.subnet_node_id,
                            epoch = epoch_data.epoch,
                            "node reached Idle-or-higher classification"
                        );
                        return None;
                    }
                }
                Err(e) => tracing::warn!("get_nodes_by_min_class failed: {e}"),
            }

            self.cancellable_sleep(Duration::from_secs_f64(epoch_data.seconds_remaining.max(0.1)))
                .await;
        }
    }

    // ---- S2: Running ----

    async fn run_forever(&self) -> TerminationReason {
        self.set_phase(EnginePhase::Running);

        // Align to the next epoch boundary before taking part, so the
        // first iteration always starts from a fresh epoch rather than
        // mid-way through whatever epoch eligibility happened to land in.
        if let Some(slot) = self.resolve_slot().await {
            if let Ok(epoch_data) = self.adapter.get_subnet_epoch_data(slot).await {
                self.cancellable_sleep(Duration::from_secs_f64(epoch_data.seconds_remaining.max(0.0)))
                    .await;
            }
        }

        loop {
            if self.is_shutdown() {
                return TerminationReason::Shutdown;
            }

            let Some(slot) = self.resolve_slot().await else {
                return TerminationReason::Shutdown;
            };

            let epoch_data = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(data) => data,
                Err(_) => {
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
            };
            let epoch = epoch_data.epoch;

            self.run_epoch_iteration(epoch, slot).await;

            if self.is_shutdown() {
                return TerminationReason::Shutdown;
            }

            let remaining = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(fresh) => fresh.seconds_remaining,
                Err(_) => epoch_data.seconds_remaining,
            };
            self.cancellable_sleep(Duration::from_secs_f64(remaining.max(0.1))).await;
        }
    }

    async fn run_epoch_iteration(&self, epoch: u64, slot: u64) {
        // Scored against the *previous* epoch's peer set: the validator's
        // submission for epoch E is itself derived from E-1, so a local
        // recomputation has to start from the same offset to ever match.
        // Pinned to that epoch's own snapshot rather than the live node
        // list: `nodes_v2[epoch - 1]` can't be overwritten by a subsequent
        // epoch's refresh while this iteration is still scoring against
        // it, which the live `get_nodes` view could.
        let scoring_epoch = epoch.saturating_sub(1);
        let peer_set = self
            .tracker
            .get_nodes_on_epoch(scoring_epoch, NodeClass::Included, None)
            .await;
        let scores = self.scoring.score(scoring_epoch, &peer_set);

        let mut validator = None;
        loop {
            if self.is_shutdown() {
                return;
            }
            match self.adapter.get_rewards_validator(self.subnet_id, epoch).await {
                Ok(Some(v)) => {
                    validator = Some(v);
                    break;
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("get_rewards_validator: {e}"),
            }
            self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
            match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(fresh) if fresh.epoch != epoch => {
                    tracing::info!(epoch, "epoch rolled over while polling for validator, aborting");
                    return;
                }
                _ => {}
            }
        }
        let Some(validator) = validator else { return };

        if validator == self.subnet_node_id {
            self.run_validator_role(epoch, scores).await;
        } else {
            self.run_attestor_role(epoch, slot, scores).await;
        }
    }

    async fn run_validator_role(&self, epoch: u64, scores: Vec<subnet_types::ScoreEntry>) {
        match self.adapter.get_consensus_data(self.subnet_id, epoch).await {
            Ok(Some(_)) => {
                tracing::debug!(epoch, "consensus data already submitted, nothing to do");
                return;
            }
            Ok(None) | Err(ChainError::NotFound) => {}
            Err(e) => tracing::warn!("get_consensus_data failed: {e}"),
        }

        tracing::info!(epoch, subnet_node_id = self.subnet_node_id, "elected validator, proposing");
        match self
            .adapter
            .propose_attestation(self.subnet_id, epoch, scores)
            .await
        {
            Ok(receipt) if receipt.is_success => {
                tracing::info!(epoch, "proposal accepted");
            }
            Ok(receipt) => {
                tracing::warn!(epoch, error = ?receipt.error_message, "proposal rejected");
            }
            Err(e) => tracing::warn!("propose_attestation failed: {e}"),
        }
    }

    async fn run_attestor_role(&self, epoch: u64, slot: u64, scores: Vec<subnet_types::ScoreEntry>) {
        let mut eligibility_checked = false;

        loop {
            if self.is_shutdown() {
                return;
            }

            let epoch_data = match self.adapter.get_subnet_epoch_data(slot).await {
                Ok(data) => data,
                Err(_) => {
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
            };
            if epoch_data.epoch != epoch || epoch_data.percent_complete > ATTESTOR_CUTOFF_PERCENT {
                tracing::info!(epoch, "attestation window closed, abstaining");
                return;
            }

            let consensus_data = match self.adapter.get_consensus_data(self.subnet_id, epoch).await {
                Ok(Some(data)) => data,
                Ok(None) | Err(ChainError::NotFound) => {
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("get_consensus_data failed: {e}");
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                    continue;
                }
            };

            if !scores_match(&scores, &consensus_data.data) {
                tracing::info!(epoch, "local scores disagree with validator submission, abstaining");
                return;
            }

            if !eligibility_checked {
                eligibility_checked = true;
                match self
                    .adapter
                    .is_validator_or_attestor(self.subnet_id, self.subnet_node_id)
                    .await
                {
                    Ok(true) => {}
                    _ => {
                        tracing::debug!(epoch, "no longer validator-or-attestor eligible, abstaining");
                        return;
                    }
                }
            }

            if consensus_data.has_attested(self.subnet_node_id) {
                tracing::debug!(epoch, "already attested this epoch");
                return;
            }

            match self.adapter.attest(self.subnet_id, epoch, self.subnet_node_id).await {
                Ok(receipt) if receipt.is_success => {
                    tracing::info!(epoch, "attestation submitted");
                    return;
                }
                Ok(receipt) => {
                    tracing::warn!(epoch, error = ?receipt.error_message, "attestation rejected, retrying");
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                }
                Err(e) => {
                    tracing::warn!("attest failed: {e}");
                    self.cancellable_sleep(Duration::from_secs(self.block_secs)).await;
                }
            }
        }
    }
}
