use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::runtime::executor::Receipt;
use crate::state::Account;
use crate::txpool::ingest::IngestResult;
use crate::txpool::pool::Tx;

/// Trait describing dependencies the RPC handlers require.
/// Implement this trait in the node wiring layer and pass into RpcServer.
#[async_trait]
pub trait RpcDeps: Send + Sync + 'static {
    /// Submit a signed transaction
    async fn submit_transaction(&self, tx: Tx) -> Result<IngestResult>;

    /// Get account by address
    async fn get_account(&self, addr: &str) -> Result<Option<Account>>;

    /// Receipt of an executed transaction, by hex id
    async fn get_receipt(&self, tx_id: &str) -> Option<Receipt>;

    /// Get mempool size
    async fn mempool_size(&self) -> usize;

    /// Token views
    async fn token_balance_of(&self, addr: &str) -> Result<u128>;
    async fn token_total_supply(&self) -> Result<u128>;

    /// Stablecoin views
    async fn stable_balance_of(&self, addr: &str) -> Result<u128>;
    async fn stable_total_supply(&self) -> Result<u128>;
    async fn depositor_balance_of(&self, addr: &str) -> Result<u128>;
    async fn fee_rate(&self) -> Result<u128>;

    /// Oracle view
    async fn oracle_price(&self) -> Result<u128>;
}

/// A small wrapper that calls into RpcDeps to handle requests
pub struct RpcHandler<D: RpcDeps> {
    deps: std::sync::Arc<D>,
}

impl<D: RpcDeps> RpcHandler<D> {
    pub fn new(deps: std::sync::Arc<D>) -> Self {
        Self { deps }
    }

    /// Return a JSON-serializable status object
    pub async fn status(&self) -> Result<Value> {
        Ok(json!({
            "mempool_size": self.deps.mempool_size().await,
            "token_total_supply": self.deps.token_total_supply().await?.to_string(),
            "stable_total_supply": self.deps.stable_total_supply().await?.to_string(),
            "oracle_price": self.deps.oracle_price().await?.to_string(),
        }))
    }

    /// JSON-RPC method: submit_tx
    pub async fn submit_tx(&self, tx: Tx) -> Result<IngestResult> {
        self.deps.submit_transaction(tx).await
    }

    pub async fn get_account(&self, addr: String) -> Result<Option<Account>> {
        self.deps.get_account(&addr).await
    }

    pub async fn get_receipt(&self, tx_id: String) -> Option<Receipt> {
        self.deps.get_receipt(&tx_id).await
    }

    pub async fn mempool_size(&self) -> Result<usize> {
        Ok(self.deps.mempool_size().await)
    }

    pub async fn token_balance_of(&self, addr: String) -> Result<String> {
        Ok(self.deps.token_balance_of(&addr).await?.to_string())
    }

    pub async fn token_total_supply(&self) -> Result<String> {
        Ok(self.deps.token_total_supply().await?.to_string())
    }

    pub async fn stable_balance_of(&self, addr: String) -> Result<String> {
        Ok(self.deps.stable_balance_of(&addr).await?.to_string())
    }

    pub async fn stable_total_supply(&self) -> Result<String> {
        Ok(self.deps.stable_total_supply().await?.to_string())
    }

    pub async fn depositor_balance_of(&self, addr: String) -> Result<String> {
        Ok(self.deps.depositor_balance_of(&addr).await?.to_string())
    }

    pub async fn fee_rate(&self) -> Result<String> {
        Ok(self.deps.fee_rate().await?.to_string())
    }

    pub async fn oracle_price(&self) -> Result<String> {
        Ok(self.deps.oracle_price().await?.to_string())
    }
}
