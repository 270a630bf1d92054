//! Ingest: accepts transactions from RPC, validates them, and inserts into
//! the pool.
//!
//! Validation is pluggable via the `TxValidator` trait. `SignatureValidator`
//! checks the ed25519 signature, the sender nonce, and that the sender can
//! cover the attached value.

use crate::txpool::pool::{TxPool, Tx, TxId, TxPoolError};
use crate::state::AccountCache;
use anyhow::Result;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("pool error: {0}")]
    PoolError(#[from] TxPoolError),
}

/// Ingest result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestResult {
    Accepted(
        #[serde(serialize_with = "crate::utils::serde_helpers::as_hex")]
        #[serde(deserialize_with = "crate::utils::serde_helpers::from_hex")]
        TxId,
    ),
    Rejected(String),
}

/// Trait for pluggable validation
#[async_trait::async_trait]
pub trait TxValidator: Send + Sync + 'static {
    async fn validate(&self, tx: &Tx) -> Result<(), String>;
}

/// Default validator: signature, nonce, and funds for the attached value.
pub struct SignatureValidator {
    pub cache: AccountCache,
}

impl SignatureValidator {
    pub fn new(cache: AccountCache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl TxValidator for SignatureValidator {
    async fn validate(&self, tx: &Tx) -> Result<(), String> {
        if !tx.verify_signature() {
            return Err("bad signature".into());
        }
        let sender = tx.sender_address();
        let account = self.cache.get(&sender).map_err(|e| e.to_string())?;
        let (nonce, wei) = account.map(|a| (a.nonce, a.wei)).unwrap_or((0, 0));
        if tx.nonce != nonce {
            return Err(format!("invalid nonce: expected {}, got {}", nonce, tx.nonce));
        }
        if wei < tx.value_wei {
            return Err("insufficient funds".into());
        }
        Ok(())
    }
}

/// TxIngestor: validates and inserts into pool
pub struct TxIngestor<V: TxValidator> {
    pub pool: Arc<TxPool>,
    pub validator: Arc<V>,
}

impl<V: TxValidator> TxIngestor<V> {
    pub fn new(pool: Arc<TxPool>, validator: Arc<V>) -> Self {
        Self { pool, validator }
    }

    /// Ingest a transaction (deserialized)
    pub async fn ingest(&self, tx: Tx) -> Result<IngestResult, IngestError> {
        if let Err(e) = self.validator.validate(&tx).await {
            return Ok(IngestResult::Rejected(e));
        }
        match self.pool.insert(tx).await {
            Ok(meta) => Ok(IngestResult::Accepted(meta.id)),
            Err(e) => Err(IngestError::from(e)),
        }
    }
}
