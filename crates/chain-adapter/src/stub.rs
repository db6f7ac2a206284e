// chain-adapter/src/stub.rs

//! Placeholder for a real JSON-RPC / Substrate-style chain client.
//!
//! The wire encoding of the blockchain RPC is explicitly out of scope for
//! this crate. This type exists
//! so the seam where a production client plugs in is visible in the type
//! system, and so `node` has something concrete to construct when run
//! without `--skip-activate-subnet` against a mock.

use crate::{ChainAdapter, ChainError, ChainResult};
use async_trait::async_trait;
use subnet_types::{ConsensusData, EpochData, NodeClass, NodeRecord, Receipt, ScoreEntry, SubnetInfo};

/// Endpoint configuration for a real chain client. Kept intentionally
/// thin: connection details belong to the concrete client, not this crate.
#[derive(Debug, Clone)]
pub struct StubRpcChainAdapter {
    pub endpoint: String,
}

impl StubRpcChainAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn unimplemented(&self, op: &str) -> ChainError {
        ChainError::Fatal(format!(
            "StubRpcChainAdapter({}): {op} is not implemented; wire a real chain client",
            self.endpoint
        ))
    }
}

#[async_trait]
impl ChainAdapter for StubRpcChainAdapter {
    async fn get_subnet_slot(&self, _subnet_id: u64) -> ChainResult<Option<u64>> {
        Err(self.unimplemented("get_subnet_slot"))
    }

    async fn get_epoch_length(&self) -> ChainResult<u64> {
        Err(self.unimplemented("get_epoch_length"))
    }

    async fn get_subnet_epoch_data(&self, _slot: u64) -> ChainResult<EpochData> {
        Err(self.unimplemented("get_subnet_epoch_data"))
    }

    async fn get_subnet_info(&self, _subnet_id: u64) -> ChainResult<Option<SubnetInfo>> {
        Err(self.unimplemented("get_subnet_info"))
    }

    async fn get_nodes_by_min_class(
        &self,
        _subnet_id: u64,
        _epoch: u64,
        _class: NodeClass,
    ) -> ChainResult<Vec<NodeRecord>> {
        Err(self.unimplemented("get_nodes_by_min_class"))
    }

    async fn get_all_nodes(&self, _subnet_id: u64) -> ChainResult<Vec<NodeRecord>> {
        Err(self.unimplemented("get_all_nodes"))
    }

    async fn get_bootnodes(&self, _subnet_id: u64) -> ChainResult<Vec<NodeRecord>> {
        Err(self.unimplemented("get_bootnodes"))
    }

    async fn get_overwatch_nodes(&self) -> ChainResult<Vec<NodeRecord>> {
        Err(self.unimplemented("get_overwatch_nodes"))
    }

    async fn get_rewards_validator(&self, _subnet_id: u64, _epoch: u64) -> ChainResult<Option<u64>> {
        Err(self.unimplemented("get_rewards_validator"))
    }

    async fn get_consensus_data(
        &self,
        _subnet_id: u64,
        _epoch: u64,
    ) -> ChainResult<Option<ConsensusData>> {
        Err(self.unimplemented("get_consensus_data"))
    }

    async fn propose_attestation(
        &self,
        _subnet_id: u64,
        _epoch: u64,
        _data: Vec<ScoreEntry>,
    ) -> ChainResult<Receipt> {
        Err(self.unimplemented("propose_attestation"))
    }

    async fn attest(&self, _subnet_id: u64, _epoch: u64, _subnet_node_id: u64) -> ChainResult<Receipt> {
        Err(self.unimplemented("attest"))
    }

    async fn is_validator_or_attestor(&self, _subnet_id: u64, _subnet_node_id: u64) -> ChainResult<bool> {
        Err(self.unimplemented("is_validator_or_attestor"))
    }
}
