//! Account model and store abstractions.
//! - Account struct (wei balance, nonce, owner, data, executable)
//! - AccountStore trait (pluggable backend)
//! - InMemAccountStore (HashMap backend; the only backend — state is
//!   in-memory by design)

use serde::{Serialize, Deserialize};
use anyhow::Result;
use std::sync::Arc;
use parking_lot::RwLock;

use crate::crypto::Address;

/// Owner tag for plain user accounts.
pub const SYSTEM_OWNER: &str = "system";
/// Owner tag for built-in program accounts.
pub const RUNTIME_OWNER: &str = "runtime";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// native currency balance in wei (1 ETH = 10^18 wei)
    #[serde(with = "crate::utils::serde_helpers::amount_str")]
    pub wei: u128,
    /// transaction nonce
    pub nonce: u64,
    /// owning subsystem tag
    pub owner: String,
    /// serialized program state (empty for user accounts)
    #[serde(serialize_with = "crate::utils::serde_helpers::as_hex")]
    #[serde(deserialize_with = "crate::utils::serde_helpers::from_hex")]
    pub data: Vec<u8>,
    /// is this a program account
    pub executable: bool,
}

impl Account {
    pub fn new(wei: u128, owner: &str, data: Vec<u8>) -> Self {
        Self {
            wei,
            nonce: 0,
            owner: owner.to_string(),
            data,
            executable: false,
        }
    }

    /// Plain user account holding `wei`.
    pub fn user(wei: u128) -> Self {
        Self::new(wei, SYSTEM_OWNER, vec![])
    }

    /// Program account carrying serialized state.
    pub fn program(data: Vec<u8>) -> Self {
        let mut acc = Self::new(0, RUNTIME_OWNER, data);
        acc.executable = true;
        acc
    }
}

/// Trait for an account persistence engine.
pub trait AccountStore: Send + Sync + 'static {
    fn get(&self, key: &Address) -> Result<Option<Account>>;
    fn insert(&self, key: Address, account: Account) -> Result<()>;
    fn remove(&self, key: &Address) -> Result<()>;
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(Address, Account)>>;
}

/// In-memory account store
#[derive(Debug, Default, Clone)]
pub struct InMemAccountStore {
    inner: Arc<RwLock<std::collections::HashMap<Address, Account>>>,
}

impl InMemAccountStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(std::collections::HashMap::new())) }
    }
}

impl AccountStore for InMemAccountStore {
    fn get(&self, key: &Address) -> Result<Option<Account>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn insert(&self, key: Address, account: Account) -> Result<()> {
        self.inner.write().insert(key, account);
        Ok(())
    }

    fn remove(&self, key: &Address) -> Result<()> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(Address, Account)>> {
        let map = self.inner.read();
        let mut out = Vec::new();
        for (k, v) in map.iter() {
            if k.starts_with(prefix) {
                out.push((k.clone(), v.clone()));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_roundtrip() {
        let store = InMemAccountStore::new();
        let key = "0xabc".to_string();
        assert!(store.get(&key).unwrap().is_none());

        store.insert(key.clone(), Account::user(100)).unwrap();
        let acc = store.get(&key).unwrap().unwrap();
        assert_eq!(acc.wei, 100);
        assert_eq!(acc.owner, SYSTEM_OWNER);

        store.remove(&key).unwrap();
        assert!(store.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_scan_prefix() {
        let store = InMemAccountStore::new();
        store.insert("0xaa".into(), Account::user(1)).unwrap();
        store.insert("0xab".into(), Account::user(2)).unwrap();
        store.insert("0xbb".into(), Account::user(3)).unwrap();
        let all = store.scan_prefix("0x").unwrap();
        assert_eq!(all.len(), 3);
        let a = store.scan_prefix("0xa").unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_program_account_flags() {
        let acc = Account::program(vec![1, 2, 3]);
        assert!(acc.executable);
        assert_eq!(acc.owner, RUNTIME_OWNER);
        assert_eq!(acc.wei, 0);
    }
}
