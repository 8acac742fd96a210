//! In-memory backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::account::Account;
use crate::error::StoreError;
use crate::namespace::Namespace;
use crate::traits::{AccountStore, KeyValueStore, NonceStore};

/// Process-local key-value store.
///
/// Several namespaces can share one backing map via [`scoped`](Self::scoped);
/// entries are keyed as `NAMESPACE-key`.
#[derive(Debug, Clone)]
pub struct MemoryKeyValueStore {
    namespace: Namespace,
    entries: Arc<DashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store for `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Returns a handle on `namespace` that shares this store's backing map.
    pub fn scoped(&self, namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: Arc::clone(&self.entries),
        }
    }

    /// Namespace this handle reads and writes.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace.prefix(), key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(self.full_key(key), value.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(&self.full_key(key)).map(|v| v.clone()))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let prefix = self.namespace.prefix();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter_map(|entry| entry.key().strip_prefix(&prefix).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(&self.full_key(key)).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let prefix = self.namespace.prefix();
        self.entries.retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }
}

/// Inserts between sweeps of expired nonces.
const PURGE_INTERVAL: usize = 256;

/// Process-local nonce and account storage for the authentication server.
///
/// Expired nonces that are never consumed are swept every
/// [`PURGE_INTERVAL`] insertions, so the nonce map holds at most the live
/// nonces plus one interval's worth of expired ones.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    nonces: DashMap<Vec<u8>, DateTime<Utc>>,
    accounts: DashMap<String, Account>,
    inserts: AtomicUsize,
}

impl MemoryAuthStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every nonce whose expiry has passed; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.nonces.len();
        self.nonces.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.nonces.len())
    }

    /// Number of outstanding nonces, expired or not.
    pub fn pending_nonces(&self) -> usize {
        self.nonces.len()
    }
}

#[async_trait]
impl NonceStore for MemoryAuthStore {
    async fn store_nonce(&self, nonce: &[u8], expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        let count = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PURGE_INTERVAL == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                debug!(event = "nonces_purged", purged);
            }
        }
        self.nonces.insert(nonce.to_vec(), expires_at);
        Ok(())
    }

    async fn verify_and_delete(&self, nonce: &[u8]) -> Result<bool, StoreError> {
        let now = Utc::now();
        if self
            .nonces
            .remove_if(nonce, |_, expires_at| *expires_at > now)
            .is_some()
        {
            return Ok(true);
        }
        if self
            .nonces
            .remove_if(nonce, |_, expires_at| *expires_at <= now)
            .is_some()
        {
            debug!(event = "nonce_expired", "dropped expired nonce");
        }
        Ok(false)
    }
}

#[async_trait]
impl AccountStore for MemoryAuthStore {
    async fn create_account(&self, account: Account) -> Result<(), StoreError> {
        match self.accounts.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::AccountExists(account.username)),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(username).map(|a| a.clone()))
    }
}
