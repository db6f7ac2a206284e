// node/src/runtime.rs
use crate::{FileKeystore, Keystore, NodeConfig};
use chain_adapter::{ChainAdapter, StubRpcChainAdapter};
use consensus_engine::{ConsensusEngine, TerminationReason};
use scoring_hook::{ScoringHook, UnitScoringHook};
use std::sync::Arc;
use subnet_tracker::{SubnetInfoTracker, TrackerConfig};

/// Wires a `ChainAdapter`, `SubnetInfoTracker`, and `ScoringHook` into a
/// running `ConsensusEngine` for one subnet node.
pub struct Node {
    config: NodeConfig,
    adapter: Arc<dyn ChainAdapter>,
    scoring: Arc<dyn ScoringHook>,
    keystore: Option<Arc<dyn Keystore>>,
    tracker: Option<Arc<SubnetInfoTracker>>,
    engine: Option<Arc<ConsensusEngine>>,
}

impl Node {
    pub fn new(config: NodeConfig) -> anyhow::Result<Self> {
        tracing::info!(
            subnet_id = config.subnet_id,
            subnet_node_id = config.subnet_node_id,
            "initializing node components"
        );

        let adapter: Arc<dyn ChainAdapter> = Arc::new(StubRpcChainAdapter::new(config.chain.endpoint.clone()));
        let scoring: Arc<dyn ScoringHook> = Arc::new(UnitScoringHook);

        let keystore: Option<Arc<dyn Keystore>> = match &config.identity_file {
            Some(path) => {
                let keystore = FileKeystore::load(path)?;
                tracing::info!(hotkey = %keystore.hotkey(), "loaded node identity");
                Some(Arc::new(keystore))
            }
            None => None,
        };

        tracing::info!("node components initialized");

        Ok(Self {
            config,
            adapter,
            scoring,
            keystore,
            tracker: None,
            engine: None,
        })
    }

    /// Spawns the background tracker and the consensus engine's run loop.
    /// Returns once both are running; the engine continues on a spawned
    /// task until `stop()` or it self-terminates.
    pub async fn start(&mut self, skip_activate_subnet: bool) -> anyhow::Result<()> {
        tracing::info!("starting subnet consensus node");

        let tracker = SubnetInfoTracker::spawn(
            self.adapter.clone(),
            TrackerConfig {
                subnet_id: self.config.subnet_id,
                updates_per_epoch: self.config.tracker.updates_per_epoch,
                block_secs: self.config.tracker.block_secs,
            },
        );

        let engine = ConsensusEngine::new(
            self.config.subnet_id,
            self.config.subnet_node_id,
            self.adapter.clone(),
            tracker.clone(),
            self.scoring.clone(),
            skip_activate_subnet,
            self.config.tracker.block_secs,
        );

        self.tracker = Some(tracker);
        self.engine = Some(engine);

        tracing::info!("subnet consensus node started");
        Ok(())
    }

    /// Drives the consensus engine to completion, returning why it
    /// terminated. Call after `start()`.
    pub async fn run(&self) -> anyhow::Result<TerminationReason> {
        let engine = self
            .engine
            .clone()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        Ok(engine.run().await)
    }

    /// The node's signing identity, if an `identity_file` was configured.
    pub fn keystore(&self) -> Option<&Arc<dyn Keystore>> {
        self.keystore.as_ref()
    }

    /// Cooperative shutdown of the engine and tracker.
    pub fn stop(&self) {
        if let Some(engine) = &self.engine {
            engine.shutdown();
        }
        if let Some(tracker) = &self.tracker {
            tracker.shutdown();
            tracker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_constructible() {
        let config = NodeConfig::default();
        assert_eq!(config.tracker.updates_per_epoch, 2);
        assert_eq!(config.tracker.block_secs, 6);
    }

    #[test]
    fn node_new_wires_stub_adapter_without_starting() {
        let config = NodeConfig {
            subnet_id: 7,
            subnet_node_id: 1,
            ..NodeConfig::default()
        };
        let node = Node::new(config).expect("construction should not touch the network");
        assert!(node.engine.is_none());
        assert!(node.tracker.is_none());
    }

    #[tokio::test]
    async fn run_before_start_errors_instead_of_panicking() {
        let node = Node::new(NodeConfig::default()).unwrap();
        assert!(node.run().await.is_err());
    }

    #[test]
    fn node_loads_identity_file_when_configured() {
        let path = std::env::temp_dir().join(format!(
            "subnet-node-runtime-identity-{}-{}.json",
            std::process::id(),
            rand::random::<u32>()
        ));
        let path = path.to_str().unwrap();
        let generated = crate::FileKeystore::generate(path).unwrap();

        let config = NodeConfig {
            identity_file: Some(path.to_string()),
            ..NodeConfig::default()
        };
        let node = Node::new(config).unwrap();

        assert_eq!(node.keystore().unwrap().hotkey(), generated);
        std::fs::remove_file(path).ok();
    }
}
