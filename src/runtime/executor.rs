//! Runtime Executor
//!
//! Drains the tx pool in arrival order, executes each call through the
//! execution environment, and commits receipts. Execution is strictly
//! sequential: program calls share the token and stablecoin state, so there
//! is no parallelism to exploit, and determinism is the contract.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Serialize, Deserialize};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::runtime::call::{CallReturn, Event};
use crate::runtime::env::ExecutionEnv;
use crate::runtime::revert::Revert;
use crate::txpool::pool::{Tx, TxPool};
use crate::utils::metrics::METRICS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: String,
    pub success: bool,
    pub err: Option<Revert>,
    pub ret: Option<CallReturn>,
    pub events: Vec<Event>,
}

pub struct Executor {
    env: ExecutionEnv,
    pool: Arc<TxPool>,
    receipts: DashMap<String, Receipt>,
}

impl Executor {
    pub fn new(env: ExecutionEnv, pool: Arc<TxPool>) -> Self {
        Self { env, pool, receipts: DashMap::new() }
    }

    pub fn env(&self) -> &ExecutionEnv {
        &self.env
    }

    /// Execute up to `limit` pooled transactions. Returns the number
    /// executed.
    pub async fn drain(&self, limit: usize) -> usize {
        let txs = self.pool.pop_batch(limit).await;
        let count = txs.len();
        for tx in txs {
            let receipt = self.execute_one(&tx);
            debug!(tx_id = %receipt.tx_id, success = receipt.success, "executed transaction");
            self.receipts.insert(receipt.tx_id.clone(), receipt);
        }
        if count > 0 {
            if let Err(e) = self.env.cache().flush() {
                error!("cache flush failed: {:?}", e);
            }
        }
        METRICS.set_gauge("mempool_size", self.pool.len() as f64);
        count
    }

    fn execute_one(&self, tx: &Tx) -> Receipt {
        let tx_id = tx.id_hex();
        let sender = tx.sender_address();

        // nonce is re-checked at execution time; pooled txs may have raced
        let expected = match self.env.nonce(&sender) {
            Ok(n) => n,
            Err(e) => return self.rejected(tx_id, e),
        };
        if tx.nonce != expected {
            return self.rejected(tx_id, Revert::msg("invalid nonce"));
        }

        // a mined transaction consumes its nonce even when it reverts;
        // first-time senders get an empty account
        let bump = self.env.cache().modify(&sender, |acc| {
            acc.nonce += 1;
            Ok(())
        });
        if bump.is_err() {
            let mut acc = crate::state::Account::user(0);
            acc.nonce = 1;
            if let Err(e) = self.env.cache().insert(sender.clone(), acc) {
                return self.rejected(tx_id, Revert::msg(format!("runtime: {}", e)));
            }
        }

        match self.env.call(&sender, tx.call.clone(), tx.value_wei) {
            Ok(outcome) => {
                METRICS.inc_counter("tx_executed");
                Receipt {
                    tx_id,
                    success: true,
                    err: None,
                    ret: Some(outcome.ret),
                    events: outcome.events,
                }
            }
            Err(revert) => {
                METRICS.inc_counter("tx_reverted");
                Receipt { tx_id, success: false, err: Some(revert), ret: None, events: vec![] }
            }
        }
    }

    fn rejected(&self, tx_id: String, err: Revert) -> Receipt {
        METRICS.inc_counter("tx_rejected");
        Receipt { tx_id, success: false, err: Some(err), ret: None, events: vec![] }
    }

    /// Look up the receipt of an executed transaction.
    pub fn receipt(&self, tx_id: &str) -> Option<Receipt> {
        self.receipts.get(tx_id).map(|r| r.value().clone())
    }

    /// Drive the executor until shutdown: drain a batch every `interval`,
    /// garbage-collecting expired pool entries along the way.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.pool.gc_ttl().await;
                    self.drain(256).await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("executor observed shutdown");
                        break;
                    }
                }
            }
        }
    }
}
