// chain-adapter/src/mock.rs

//! An in-memory stand-in for the blockchain RPC, grounded on
//! `subnet/hypertensor/mock/mock_db.py` and `local_chain_functions` in the
//! original source: a small ledger a test can script epoch-by-epoch
//! (register nodes, elect a validator, publish consensus data) without any
//! real chain.

use crate::{ChainAdapter, ChainError, ChainResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use subnet_types::{ConsensusData, EpochData, NodeClass, NodeRecord, Receipt, ScoreEntry, SubnetInfo, SubnetState};

#[derive(Debug, Default)]
struct MockState {
    slot: Option<u64>,
    epoch_length: u64,
    subnet_info: Option<SubnetInfo>,
    epoch: u64,
    seconds_remaining: f64,
    percent_complete: f64,
    blocks_remaining: u64,
    nodes: Vec<NodeRecord>,
    bootnodes: Vec<NodeRecord>,
    overwatch_nodes: Vec<NodeRecord>,
    validators: HashMap<u64, u64>,
    consensus_data: HashMap<u64, ConsensusData>,
    attestor_eligible: HashMap<u64, bool>,
    propose_calls: Vec<(u64, u64, Vec<ScoreEntry>)>,
    attest_calls: Vec<(u64, u64, u64)>,
    force_transient: bool,
}

/// A scriptable `ChainAdapter` for tests. All mutation happens through the
/// plain (non-async, non-`Result`) helper methods below; the trait
/// implementation only reads.
pub struct MockChainAdapter {
    state: Mutex<MockState>,
}

impl Default for MockChainAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainAdapter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                epoch_length: 10,
                ..Default::default()
            }),
        }
    }

    pub fn set_slot(&self, slot: Option<u64>) {
        self.state.lock().unwrap().slot = slot;
    }

    pub fn set_epoch_length(&self, epoch_length: u64) {
        self.state.lock().unwrap().epoch_length = epoch_length;
    }

    pub fn set_subnet_state(&self, state: Option<SubnetState>) {
        self.state.lock().unwrap().subnet_info = state.map(|state| SubnetInfo { state });
    }

    /// Moves to a fresh epoch at 0% progress with the full epoch remaining.
    pub fn advance_epoch(&self) {
        let mut s = self.state.lock().unwrap();
        s.epoch += 1;
        s.percent_complete = 0.0;
        s.blocks_remaining = s.epoch_length;
        s.seconds_remaining = s.epoch_length as f64;
    }

    pub fn set_epoch_progress(&self, percent_complete: f64, seconds_remaining: f64) {
        let mut s = self.state.lock().unwrap();
        s.percent_complete = percent_complete;
        s.seconds_remaining = seconds_remaining;
    }

    pub fn set_nodes(&self, nodes: Vec<NodeRecord>) {
        self.state.lock().unwrap().nodes = nodes;
    }

    pub fn set_bootnodes(&self, nodes: Vec<NodeRecord>) {
        self.state.lock().unwrap().bootnodes = nodes;
    }

    pub fn set_overwatch_nodes(&self, nodes: Vec<NodeRecord>) {
        self.state.lock().unwrap().overwatch_nodes = nodes;
    }

    pub fn set_validator(&self, epoch: u64, subnet_node_id: u64) {
        self.state.lock().unwrap().validators.insert(epoch, subnet_node_id);
    }

    pub fn set_attestor_eligible(&self, subnet_node_id: u64, eligible: bool) {
        self.state
            .lock()
            .unwrap()
            .attestor_eligible
            .insert(subnet_node_id, eligible);
    }

    pub fn set_force_transient(&self, force: bool) {
        self.state.lock().unwrap().force_transient = force;
    }

    /// Directly install a consensus-data record, bypassing
    /// `propose_attestation`, for scenarios that pre-seed validator output.
    pub fn seed_consensus_data(&self, epoch: u64, data: ConsensusData) {
        self.state.lock().unwrap().consensus_data.insert(epoch, data);
    }

    pub fn propose_calls(&self) -> Vec<(u64, u64, Vec<ScoreEntry>)> {
        self.state.lock().unwrap().propose_calls.clone()
    }

    pub fn attest_calls(&self) -> Vec<(u64, u64, u64)> {
        self.state.lock().unwrap().attest_calls.clone()
    }
}

#[async_trait]
impl ChainAdapter for MockChainAdapter {
    async fn get_subnet_slot(&self, _subnet_id: u64) -> ChainResult<Option<u64>> {
        Ok(self.state.lock().unwrap().slot)
    }

    async fn get_epoch_length(&self) -> ChainResult<u64> {
        Ok(self.state.lock().unwrap().epoch_length)
    }

    async fn get_subnet_epoch_data(&self, _slot: u64) -> ChainResult<EpochData> {
        let s = self.state.lock().unwrap();
        Ok(EpochData::new(
            s.epoch,
            s.blocks_remaining,
            s.seconds_remaining,
            s.percent_complete,
        ))
    }

    async fn get_subnet_info(&self, _subnet_id: u64) -> ChainResult<Option<SubnetInfo>> {
        Ok(self.state.lock().unwrap().subnet_info.clone())
    }

    async fn get_nodes_by_min_class(
        &self,
        _subnet_id: u64,
        epoch: u64,
        class: NodeClass,
    ) -> ChainResult<Vec<NodeRecord>> {
        let s = self.state.lock().unwrap();
        Ok(s.nodes
            .iter()
            .filter(|n| n.is_at_least(class, epoch))
            .cloned()
            .collect())
    }

    async fn get_all_nodes(&self, _subnet_id: u64) -> ChainResult<Vec<NodeRecord>> {
        Ok(self.state.lock().unwrap().nodes.clone())
    }

    async fn get_bootnodes(&self, _subnet_id: u64) -> ChainResult<Vec<NodeRecord>> {
        Ok(self.state.lock().unwrap().bootnodes.clone())
    }

    async fn get_overwatch_nodes(&self) -> ChainResult<Vec<NodeRecord>> {
        Ok(self.state.lock().unwrap().overwatch_nodes.clone())
    }

    async fn get_rewards_validator(&self, _subnet_id: u64, epoch: u64) -> ChainResult<Option<u64>> {
        Ok(self.state.lock().unwrap().validators.get(&epoch).copied())
    }

    async fn get_consensus_data(
        &self,
        _subnet_id: u64,
        epoch: u64,
    ) -> ChainResult<Option<ConsensusData>> {
        Ok(self.state.lock().unwrap().consensus_data.get(&epoch).cloned())
    }

    async fn propose_attestation(
        &self,
        subnet_id: u64,
        epoch: u64,
        data: Vec<ScoreEntry>,
    ) -> ChainResult<Receipt> {
        let mut s = self.state.lock().unwrap();
        if s.force_transient {
            return Err(ChainError::Transient("mock forced transient".into()));
        }
        if s.consensus_data.contains_key(&epoch) {
            return Ok(Receipt::failure("consensus data already submitted"));
        }
        let validator_id = s.validators.get(&epoch).copied().unwrap_or(0);
        let record = ConsensusData {
            validator_id,
            validator_epoch_progress: s.percent_complete,
            data: data.clone(),
            attests: Default::default(),
            subnet_nodes: data.iter().map(|e| e.subnet_node_id).collect(),
            prioritize_queue_node_id: None,
            remove_queue_node_id: None,
        };
        s.consensus_data.insert(epoch, record);
        s.propose_calls.push((subnet_id, epoch, data));
        Ok(Receipt::success())
    }

    async fn attest(&self, subnet_id: u64, epoch: u64, subnet_node_id: u64) -> ChainResult<Receipt> {
        let mut s = self.state.lock().unwrap();
        if s.force_transient {
            return Err(ChainError::Transient("mock forced transient".into()));
        }
        match s.consensus_data.get_mut(&epoch) {
            Some(record) => {
                record.attests.insert(subnet_node_id);
                s.attest_calls.push((subnet_id, epoch, subnet_node_id));
                Ok(Receipt::success())
            }
            None => Ok(Receipt::failure("no consensus data to attest")),
        }
    }

    async fn is_validator_or_attestor(&self, _subnet_id: u64, subnet_node_id: u64) -> ChainResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .attestor_eligible
            .get(&subnet_node_id)
            .copied()
            .unwrap_or(true))
    }
}
