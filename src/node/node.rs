//! Node orchestration: wire up state, runtime, txpool, and rpc.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::node::genesis::{self, GenesisConfig, GenesisInfo};
use crate::node::service_handle::ServiceHandle;
use crate::rpc::auth::AuthConfig;
use crate::rpc::handlers::RpcDeps;
use crate::rpc::server::RpcServer;
use crate::runtime::executor::{Executor, Receipt};
use crate::runtime::env::ExecutionEnv;
use crate::state::{Account, AccountCache, InMemAccountStore};
use crate::txpool::ingest::{IngestResult, SignatureValidator, TxIngestor};
use crate::txpool::pool::{Tx, TxPool};
use crate::utils::errors::NodeError;

#[derive(Clone)]
pub struct NodeConfig {
    pub rpc_addr: String,
    pub genesis: GenesisConfig,
    pub max_txpool_size: usize,
    pub drain_interval_ms: u64,
}

impl NodeConfig {
    pub fn dev(rpc_addr: &str) -> Self {
        Self {
            rpc_addr: rpc_addr.to_string(),
            genesis: GenesisConfig::default_dev(),
            max_txpool_size: 10_000,
            drain_interval_ms: 50,
        }
    }
}

/// Main Node object
pub struct Node {
    cfg: NodeConfig,
}

struct NodeRpcDeps {
    executor: Arc<Executor>,
    pool: Arc<TxPool>,
    cache: AccountCache,
    validator: Arc<SignatureValidator>,
}

impl NodeRpcDeps {
    fn env(&self) -> &ExecutionEnv {
        self.executor.env()
    }
}

#[async_trait]
impl RpcDeps for NodeRpcDeps {
    async fn submit_transaction(&self, tx: Tx) -> Result<IngestResult> {
        let ingestor = TxIngestor::new(self.pool.clone(), self.validator.clone());
        Ok(ingestor.ingest(tx).await?)
    }

    async fn get_account(&self, addr: &str) -> Result<Option<Account>> {
        self.cache.get(&addr.to_string())
    }

    async fn get_receipt(&self, tx_id: &str) -> Option<Receipt> {
        self.executor.receipt(tx_id)
    }

    async fn mempool_size(&self) -> usize {
        self.pool.len()
    }

    async fn token_balance_of(&self, addr: &str) -> Result<u128> {
        Ok(self.env().token()?.balance_of(&addr.to_string()))
    }

    async fn token_total_supply(&self) -> Result<u128> {
        Ok(self.env().token()?.total_supply())
    }

    async fn stable_balance_of(&self, addr: &str) -> Result<u128> {
        Ok(self.env().stablecoin()?.ledger.balance_of(&addr.to_string()))
    }

    async fn stable_total_supply(&self) -> Result<u128> {
        Ok(self.env().stablecoin()?.ledger.total_supply())
    }

    async fn depositor_balance_of(&self, addr: &str) -> Result<u128> {
        Ok(self.env().stablecoin()?.depositor.balance_of(&addr.to_string()))
    }

    async fn fee_rate(&self) -> Result<u128> {
        Ok(self.env().stablecoin()?.fee_rate_percentage)
    }

    async fn oracle_price(&self) -> Result<u128> {
        Ok(self.env().oracle_price()?)
    }
}

impl Node {
    pub fn new(cfg: NodeConfig) -> Self {
        Self { cfg }
    }

    /// Start the node: install genesis, spawn the executor loop and the RPC
    /// server, and return a ServiceHandle for graceful shutdown.
    pub async fn start(self) -> Result<(ServiceHandle, GenesisInfo)> {
        let (mut svc_handle, shutdown_rx) = ServiceHandle::new();

        // -----------------------
        // State (AccountStore -> AccountCache) + genesis
        // -----------------------
        let account_store = Arc::new(InMemAccountStore::new());
        let account_cache = AccountCache::new(account_store);
        let info = genesis::install(&self.cfg.genesis, &account_cache)?;
        info!(deployer = %info.deployer, accounts = info.dev_addresses.len(), "genesis installed");

        // -----------------------
        // Runtime + TxPool
        // -----------------------
        let env = ExecutionEnv::new(account_cache.clone());
        let pool = Arc::new(TxPool::new(
            self.cfg.max_txpool_size,
            Duration::from_secs(60 * 60),
        ));
        let executor = Arc::new(Executor::new(env, pool.clone()));

        // Executor drain loop
        {
            let executor = executor.clone();
            let shutdown_rx = shutdown_rx.clone();
            let interval = Duration::from_millis(self.cfg.drain_interval_ms);
            let h: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
                executor.run(shutdown_rx, interval).await;
                Ok(())
            });
            svc_handle.attach(h);
        }

        // -----------------------
        // RPC server
        // -----------------------
        {
            let deps = Arc::new(NodeRpcDeps {
                executor: executor.clone(),
                pool: pool.clone(),
                cache: account_cache.clone(),
                validator: Arc::new(SignatureValidator::new(account_cache.clone())),
            });
            let rpc_addr = self.cfg.rpc_addr.parse().map_err(|e| {
                NodeError::ConfigError(format!("bad rpc address {}: {}", self.cfg.rpc_addr, e))
            })?;
            let auth = AuthConfig::disabled();
            let server = RpcServer::new(rpc_addr, deps, auth);
            let shutdown_rx = shutdown_rx.clone();
            let h: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
                if let Err(e) = server.start(shutdown_rx).await {
                    error!("RPC server failed: {:?}", e);
                    return Err(e);
                }
                Ok(())
            });
            svc_handle.attach(h);
        }

        info!("Node started, RPC: {}", self.cfg.rpc_addr);
        Ok((svc_handle, info))
    }
}
