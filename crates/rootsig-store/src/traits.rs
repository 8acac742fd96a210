//! Storage backend traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::account::Account;
use crate::error::StoreError;

/// String key-value storage scoped to a single namespace.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Inserts or replaces `key`.
    async fn store(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns the value for `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Lists keys in this namespace, sorted.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Removes `key`; returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every key in this namespace.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Storage for single-use, expiring challenge nonces.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Records `nonce` as valid until `expires_at`.
    async fn store_nonce(&self, nonce: &[u8], expires_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Consumes `nonce` if present and unexpired.
    ///
    /// Must be atomic: of any number of concurrent calls for the same nonce, at
    /// most one returns `true`. Expired entries are dropped and report `false`.
    async fn verify_and_delete(&self, nonce: &[u8]) -> Result<bool, StoreError>;
}

/// Storage for registered accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts `account` unless the username is taken.
    ///
    /// Returns [`StoreError::AccountExists`] if it is; the check and the insert
    /// are a single atomic step.
    async fn create_account(&self, account: Account) -> Result<(), StoreError>;

    /// Looks up an account by username.
    async fn get_account(&self, username: &str) -> Result<Option<Account>, StoreError>;
}
