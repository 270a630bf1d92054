//! In-memory account cache with write-back and snapshot/restore support.
//! - Uses DashMap for concurrent access
//! - Provides get/insert/modify APIs used by the runtime
//! - `snapshot`/`restore` materialize and reinstate the full visible state;
//!   the runtime uses them to make every program call atomic

use crate::state::account::{Account, AccountStore};
use crate::crypto::Address;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;
use parking_lot::RwLock;

/// Cache entry holds Account plus dirty flag
#[derive(Debug, Clone)]
struct CacheEntry {
    account: Account,
    dirty: bool,
}

#[derive(Clone)]
pub struct AccountCache {
    /// in-memory concurrent map: address -> CacheEntry
    map: Arc<DashMap<Address, Arc<RwLock<CacheEntry>>>>,
    /// backing store
    store: Arc<dyn AccountStore>,
}

impl AccountCache {
    /// Create new cache with backing store
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            store,
        }
    }

    /// Load account from cache or backing store
    pub fn get(&self, key: &Address) -> Result<Option<Account>> {
        if let Some(e) = self.map.get(key) {
            let guard = e.value().read();
            return Ok(Some(guard.account.clone()));
        }
        if let Some(acc) = self.store.get(key)? {
            let entry = CacheEntry { account: acc.clone(), dirty: false };
            self.map.insert(key.clone(), Arc::new(RwLock::new(entry)));
            Ok(Some(acc))
        } else {
            Ok(None)
        }
    }

    /// Insert or overwrite an account in cache (mark dirty)
    pub fn insert(&self, key: Address, account: Account) -> Result<()> {
        let entry = CacheEntry { account, dirty: true };
        self.map.insert(key, Arc::new(RwLock::new(entry)));
        Ok(())
    }

    /// Modify account via closure. Returns error if account missing.
    pub fn modify<F>(&self, key: &Address, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut Account) -> Result<()>,
    {
        if let Some(e) = self.map.get(key) {
            let mut guard = e.value().write();
            mutator(&mut guard.account)?;
            guard.dirty = true;
            return Ok(());
        }
        // load into cache, then modify
        if let Some(acc) = self.store.get(key)? {
            let entry = CacheEntry { account: acc, dirty: true };
            self.map.insert(key.clone(), Arc::new(RwLock::new(entry)));
            if let Some(e2) = self.map.get(key) {
                let mut guard = e2.value().write();
                mutator(&mut guard.account)?;
                guard.dirty = true;
                return Ok(());
            }
        }
        Err(anyhow::anyhow!("account not found: {}", key))
    }

    /// Flush dirty entries back to backing store
    pub fn flush(&self) -> Result<()> {
        for r in self.map.iter() {
            let key = r.key().clone();
            let entry_lock = r.value().clone();
            let guard = entry_lock.read();
            if guard.dirty {
                self.store.insert(key.clone(), guard.account.clone())?;
                drop(guard);
                let mut guard_mut = entry_lock.write();
                guard_mut.dirty = false;
            }
        }
        Ok(())
    }

    /// Materialize the full visible state (cache over store).
    pub fn snapshot(&self) -> Result<HashMap<Address, Account>> {
        let mut out = HashMap::new();
        for (k, v) in self.store.scan_prefix("")? {
            out.insert(k, v);
        }
        // cache entries shadow the store
        for r in self.map.iter() {
            let key = r.key().clone();
            let guard = r.value().read();
            out.insert(key, guard.account.clone());
        }
        Ok(out)
    }

    /// Reinstate a previously taken snapshot. Accounts created after the
    /// snapshot are removed, both in cache and store.
    pub fn restore(&self, snapshot: HashMap<Address, Account>) -> Result<()> {
        for (k, _) in self.store.scan_prefix("")? {
            if !snapshot.contains_key(&k) {
                self.store.remove(&k)?;
            }
        }
        self.map.clear();
        for (k, acc) in snapshot {
            let entry = CacheEntry { account: acc, dirty: true };
            self.map.insert(k, Arc::new(RwLock::new(entry)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::account::InMemAccountStore;

    #[test]
    fn test_cache_get_insert_flush() {
        let store = Arc::new(InMemAccountStore::new());
        let cache = AccountCache::new(store.clone());
        let key = "0xalice".to_string();
        assert!(cache.get(&key).unwrap().is_none());

        let acc = Account::user(100);
        cache.insert(key.clone(), acc.clone()).unwrap();
        let fetched = cache.get(&key).unwrap().unwrap();
        assert_eq!(fetched.wei, 100);

        cache.flush().unwrap();
        let persisted = store.get(&key).unwrap().unwrap();
        assert_eq!(persisted.wei, 100);
    }

    #[test]
    fn test_modify_marks_dirty_and_flushes() {
        let store = Arc::new(InMemAccountStore::new());
        let cache = AccountCache::new(store.clone());
        store.insert("0xa".into(), Account::user(50)).unwrap();

        cache
            .modify(&"0xa".to_string(), |acc| {
                acc.wei += 25;
                Ok(())
            })
            .unwrap();
        cache.flush().unwrap();
        assert_eq!(store.get(&"0xa".to_string()).unwrap().unwrap().wei, 75);
    }

    #[test]
    fn test_snapshot_restore_rolls_back_changes() {
        let store = Arc::new(InMemAccountStore::new());
        let cache = AccountCache::new(store.clone());
        cache.insert("0xa".into(), Account::user(100)).unwrap();
        cache.flush().unwrap();

        let snap = cache.snapshot().unwrap();

        // mutate an existing account and create a new one
        cache
            .modify(&"0xa".to_string(), |acc| {
                acc.wei = 1;
                Ok(())
            })
            .unwrap();
        cache.insert("0xb".into(), Account::user(999)).unwrap();
        cache.flush().unwrap();

        cache.restore(snap).unwrap();
        assert_eq!(cache.get(&"0xa".to_string()).unwrap().unwrap().wei, 100);
        assert!(cache.get(&"0xb".to_string()).unwrap().is_none());
    }

    #[test]
    fn test_restore_removes_store_resident_accounts() {
        let store = Arc::new(InMemAccountStore::new());
        let cache = AccountCache::new(store.clone());
        let snap = cache.snapshot().unwrap();

        cache.insert("0xnew".into(), Account::user(7)).unwrap();
        cache.flush().unwrap();
        assert!(store.get(&"0xnew".to_string()).unwrap().is_some());

        cache.restore(snap).unwrap();
        assert!(cache.get(&"0xnew".to_string()).unwrap().is_none());
        assert!(store.get(&"0xnew".to_string()).unwrap().is_none());
    }
}
