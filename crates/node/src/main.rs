// node/src/main.rs
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "subnet-consensus-node")]
#[command(about = "Epoch-driven subnet consensus node", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the consensus engine for one subnet node
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "./config.toml")]
        config: String,

        /// Override the configured subnet id
        #[arg(long)]
        subnet_id: Option<u64>,

        /// Override the configured subnet node id
        #[arg(long)]
        subnet_node_id: Option<u64>,

        /// Skip waiting for subnet activation (S0); start directly at S1.
        /// For subnets already known to be active.
        #[arg(long)]
        skip_activate_subnet: bool,
    },

    /// Write a default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./config.toml")]
        config: String,

        /// Also generate an identity file and point the config at it
        #[arg(long)]
        identity: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={},hyper=warn,h2=warn", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run {
            config,
            subnet_id,
            subnet_node_id,
            skip_activate_subnet,
        } => {
            run_node(&config, subnet_id, subnet_node_id, skip_activate_subnet).await?;
        }
        Commands::Init { config, identity } => {
            init_config(&config, identity.as_deref())?;
        }
    }

    Ok(())
}

async fn run_node(
    config_path: &str,
    subnet_id_override: Option<u64>,
    subnet_node_id_override: Option<u64>,
    skip_activate_subnet: bool,
) -> anyhow::Result<()> {
    use node::{Node, NodeConfig};

    tracing::info!("loading configuration from {config_path}");
    let mut config = NodeConfig::from_file(config_path)?;

    if let Some(subnet_id) = subnet_id_override {
        config.subnet_id = subnet_id;
    }
    if let Some(subnet_node_id) = subnet_node_id_override {
        config.subnet_node_id = subnet_node_id;
    }

    tracing::info!(
        subnet_id = config.subnet_id,
        subnet_node_id = config.subnet_node_id,
        "starting node"
    );

    let mut node = Node::new(config)?;
    node.start(skip_activate_subnet).await?;

    let node = std::sync::Arc::new(node);
    let run_handle = tokio::spawn({
        let node = node.clone();
        async move { node.run().await }
    });

    tokio::select! {
        result = run_handle => {
            let reason = result??;
            tracing::info!(?reason, "consensus engine terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
            node.stop();
        }
    }

    Ok(())
}

fn init_config(path: &str, identity_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = node::NodeConfig::default();

    if let Some(identity_path) = identity_path {
        let hotkey = node::FileKeystore::generate(identity_path)?;
        tracing::info!(%hotkey, "wrote new identity file to {identity_path}");
        config.identity_file = Some(identity_path.to_string());
    }

    config.to_file(path)?;
    tracing::info!("wrote default configuration to {path}");
    Ok(())
}
