// chain-adapter/src/lib.rs

//! Stateless bridge to the blockchain RPC surface the consensus engine
//! needs: epoch data, node lists, validator election, consensus-data
//! reads, and attestation/proposal submission.
//!
//! The wire encoding of the underlying RPC client is deliberately out of
//! scope here — only the call surface and its error taxonomy are owned by
//! this crate.

pub mod mock;
pub mod stub;

pub use mock::MockChainAdapter;
pub use stub::StubRpcChainAdapter;

use async_trait::async_trait;
use subnet_types::{ConsensusData, EpochData, NodeClass, NodeRecord, Receipt, SubnetInfo};

/// Result type for adapter operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Every adapter operation fails in one of exactly three ways. The
/// adapter itself never retries; retry policy lives in the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// Retry with back-off equal to the chain's block time.
    #[error("transient RPC failure: {0}")]
    Transient(String),
    /// Not found / not yet available this epoch. Not an error condition
    /// by itself -- callers decide whether to retry within the epoch.
    #[error("not found")]
    NotFound,
    /// Unrecoverable; the caller logs and moves on (or, for repeated
    /// subnet-info `NotFound`, terminates).
    #[error("fatal RPC error: {0}")]
    Fatal(String),
}

/// The blockchain RPC facade consumed by the tracker and the consensus
/// engine. None of them retry internally; retry policy lives in the caller.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    async fn get_subnet_slot(&self, subnet_id: u64) -> ChainResult<Option<u64>>;

    async fn get_epoch_length(&self) -> ChainResult<u64>;

    async fn get_subnet_epoch_data(&self, slot: u64) -> ChainResult<EpochData>;

    async fn get_subnet_info(&self, subnet_id: u64) -> ChainResult<Option<SubnetInfo>>;

    async fn get_nodes_by_min_class(
        &self,
        subnet_id: u64,
        epoch: u64,
        class: NodeClass,
    ) -> ChainResult<Vec<NodeRecord>>;

    async fn get_all_nodes(&self, subnet_id: u64) -> ChainResult<Vec<NodeRecord>>;

    async fn get_bootnodes(&self, subnet_id: u64) -> ChainResult<Vec<NodeRecord>>;

    async fn get_overwatch_nodes(&self) -> ChainResult<Vec<NodeRecord>>;

    async fn get_rewards_validator(&self, subnet_id: u64, epoch: u64) -> ChainResult<Option<u64>>;

    async fn get_consensus_data(
        &self,
        subnet_id: u64,
        epoch: u64,
    ) -> ChainResult<Option<ConsensusData>>;

    async fn propose_attestation(
        &self,
        subnet_id: u64,
        epoch: u64,
        data: Vec<subnet_types::ScoreEntry>,
    ) -> ChainResult<Receipt>;

    async fn attest(&self, subnet_id: u64, epoch: u64, subnet_node_id: u64) -> ChainResult<Receipt>;

    /// True iff `subnet_node_id` currently holds Validator class and can
    /// therefore be elected or attest. Checked once per epoch by an
    /// attestor right before attesting, in case emergency validators were
    /// set mid-epoch.
    async fn is_validator_or_attestor(&self, subnet_id: u64, subnet_node_id: u64) -> ChainResult<bool>;
}
