//! TxPool: in-memory transaction pool with dedup, TTL, and bounded size.
//!
//! Data model:
//! - Tx: signed call (sender key, nonce, call, attached value, signature)
//! - TxId: SHA-256 of the serialized bytes
//! - Under the hood: DashMap<TxId, TxEntry> for lookup + a FIFO queue for
//!   execution order. Admission is first-come-first-served; there is no fee
//!   market, so arrival order is the only priority.

use serde::{Serialize, Deserialize};
use std::collections::VecDeque;
use std::sync::Arc;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use sha2::{Sha256, Digest};
use tokio::sync::Mutex;
use thiserror::Error;

use crate::crypto::{Address, Keypair, PublicKey, Signature, Signer, Verifier};
use crate::runtime::call::Call;

/// Transaction ID type (SHA-256)
pub type TxId = Vec<u8>;

/// Signed transaction submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub from: PublicKey,
    pub nonce: u64,
    pub call: Call,
    #[serde(with = "crate::utils::serde_helpers::amount_str")]
    pub value_wei: u128,
    pub signature: Signature,
}

impl Tx {
    /// Build and sign a transaction in one step.
    pub fn sign(kp: &Keypair, nonce: u64, call: Call, value_wei: u128) -> Self {
        let from = kp.public();
        let body = body_bytes(&from, nonce, &call, value_wei);
        let signature = kp.sign(&body);
        Self { from, nonce, call, value_wei, signature }
    }

    pub fn serialized(&self) -> Vec<u8> {
        bincode::serialize(self).expect("serialize tx")
    }

    pub fn id(&self) -> TxId {
        let bin = self.serialized();
        let mut h = Sha256::new();
        h.update(&bin);
        h.finalize().to_vec()
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.id())
    }

    pub fn sender_address(&self) -> Address {
        self.from.address()
    }

    pub fn verify_signature(&self) -> bool {
        let body = body_bytes(&self.from, self.nonce, &self.call, self.value_wei);
        self.from.verify(&body, &self.signature).is_ok()
    }
}

fn body_bytes(from: &PublicKey, nonce: u64, call: &Call, value_wei: u128) -> Vec<u8> {
    bincode::serialize(&(from, nonce, call, value_wei)).expect("serialize tx body")
}

/// Metadata tracked for each tx in pool
#[derive(Debug, Clone)]
pub struct TxMeta {
    pub id: TxId,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

/// Error types
#[derive(Debug, Error)]
pub enum TxPoolError {
    #[error("duplicate tx")]
    Duplicate,
    #[error("pool full")]
    PoolFull,
}

/// Internal pool entry
struct TxEntry {
    tx: Tx,
    meta: TxMeta,
}

/// The TxPool main struct
pub struct TxPool {
    // fast lookup: txid -> TxEntry
    entries: DashMap<TxId, Arc<TxEntry>>,
    // execution order (FIFO); may hold stale ids, skipped on pop
    queue: Mutex<VecDeque<TxId>>,
    // configuration
    pub max_size: usize,
    pub ttl: Duration,
}

impl TxPool {
    /// Create new pool
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            queue: Mutex::new(VecDeque::new()),
            max_size,
            ttl,
        }
    }

    /// Insert transaction after validation by caller.
    /// Returns TxMeta or error (duplicate / pool full).
    pub async fn insert(&self, tx: Tx) -> Result<TxMeta, TxPoolError> {
        let txid = tx.id();
        // dedup
        if self.entries.contains_key(&txid) {
            return Err(TxPoolError::Duplicate);
        }

        // admission control: evict the oldest pending tx when full
        if self.entries.len() >= self.max_size && !self.evict_oldest().await {
            return Err(TxPoolError::PoolFull);
        }

        let meta = TxMeta { id: txid.clone(), inserted_at: Instant::now(), ttl: self.ttl };
        let entry = TxEntry { tx, meta: meta.clone() };
        self.entries.insert(txid.clone(), Arc::new(entry));
        let mut queue = self.queue.lock().await;
        queue.push_back(txid);
        Ok(meta)
    }

    /// Evict the oldest pending entry. Returns true if eviction occurred.
    async fn evict_oldest(&self) -> bool {
        let mut queue = self.queue.lock().await;
        while let Some(txid) = queue.pop_front() {
            if self.entries.remove(&txid).is_some() {
                return true;
            }
        }
        false
    }

    /// Pop up to `limit` transactions in arrival order.
    pub async fn pop_batch(&self, limit: usize) -> Vec<Tx> {
        let mut selected = Vec::new();
        let mut queue = self.queue.lock().await;
        while selected.len() < limit {
            let Some(txid) = queue.pop_front() else { break };
            // skip ids already removed (gc, eviction)
            if let Some((_, entry)) = self.entries.remove(&txid) {
                selected.push(entry.tx.clone());
            }
        }
        selected
    }

    /// Get tx by id
    pub fn get(&self, txid: &TxId) -> Option<Tx> {
        self.entries.get(txid).map(|arc| arc.value().tx.clone())
    }

    /// Cleanup expired transactions by TTL
    pub async fn gc_ttl(&self) {
        let now = Instant::now();
        let keys: Vec<TxId> = self
            .entries
            .iter()
            .filter_map(|r| {
                let e = r.value();
                if now.duration_since(e.meta.inserted_at) > e.meta.ttl {
                    Some(e.meta.id.clone())
                } else {
                    None
                }
            })
            .collect();

        for k in keys {
            self.entries.remove(&k);
        }
    }

    /// Pool size
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
