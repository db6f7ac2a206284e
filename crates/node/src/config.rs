// node/src/config.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub subnet_id: u64,
    pub subnet_node_id: u64,
    pub chain: ChainConfig,
    pub tracker: TrackerSettings,
    /// Path to a JSON identity file holding the node's hotkey. `None` means
    /// no keystore is wired up, which is fine for `ConsensusEngine` itself
    /// since it never signs anything -- `ChainAdapter` owns that boundary.
    #[serde(default)]
    pub identity_file: Option<String>,
}

/// Endpoint for the real chain client. The wire protocol itself is out of
/// scope here (see `chain_adapter::StubRpcChainAdapter`); this struct just
/// carries the address a production client would dial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// `K`: additional refreshes per epoch beyond the mandatory boundary one.
    pub updates_per_epoch: u32,
    /// Chain block time in seconds, used both as the tracker's sub-epoch
    /// interval input and the engine's retry back-off.
    pub block_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            subnet_id: 0,
            subnet_node_id: 0,
            chain: ChainConfig {
                endpoint: "ws://127.0.0.1:9944".into(),
            },
            tracker: TrackerSettings {
                updates_per_epoch: 2,
                block_secs: 6,
            },
            identity_file: None,
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
