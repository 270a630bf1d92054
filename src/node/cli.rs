use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;

use crate::crypto::Keypair;
use crate::node::genesis::GenesisConfig;
use crate::node::node::{Node, NodeConfig};
use crate::utils::logging::init_logging;

/// CLI for node control.
#[derive(Parser)]
#[clap(name = "oxyr-node", version)]
pub struct Cli {
    /// Path to data directory
    #[clap(long, default_value = "./data")]
    pub data_dir: PathBuf,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Initialize the data directory with a default genesis file
    Init,
    /// Run the node
    Run {
        /// rpc bind address (host:port)
        #[clap(long, default_value = "127.0.0.1:8545")]
        rpc: String,

        /// genesis file (defaults to <data_dir>/genesis.toml if present)
        #[clap(long)]
        genesis: Option<PathBuf>,
    },
    /// Generate a fresh keypair and print its address
    Keygen,
}

pub async fn run_cli() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Init => {
            std::fs::create_dir_all(&cli.data_dir)?;
            let path = cli.data_dir.join("genesis.toml");
            GenesisConfig::default_dev().save(&path)?;
            println!("initialized genesis at {}", path.display());
            Ok(())
        }
        Cmd::Run { rpc, genesis } => {
            // genesis from flag, from the data dir, or the built-in default
            let cfg = if let Some(path) = genesis {
                GenesisConfig::load(path)?
            } else {
                let default_path = cli.data_dir.join("genesis.toml");
                if default_path.exists() {
                    GenesisConfig::load(default_path)?
                } else {
                    GenesisConfig::default_dev()
                }
            };

            let node = Node::new(NodeConfig {
                rpc_addr: rpc,
                genesis: cfg,
                max_txpool_size: 10_000,
                drain_interval_ms: 50,
            });
            let (svc, info) = node.start().await?;
            println!("deployer: {}", info.deployer);
            for (i, addr) in info.dev_addresses.iter().enumerate() {
                println!("dev[{}]: {}", i, addr);
            }
            // Wait for Ctrl+C
            tokio::signal::ctrl_c().await?;
            println!("Shutting down node...");
            svc.shutdown().await?;
            println!("Node stopped");
            Ok(())
        }
        Cmd::Keygen => {
            let kp = Keypair::generate();
            println!("address: {}", kp.address());
            println!("public:  {}", hex::encode(kp.public().0));
            println!("secret:  {}", hex::encode(kp.secret_bytes()));
            Ok(())
        }
    }
}
