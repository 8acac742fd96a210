//! Storage collaborators for rootsig.
//!
//! This crate provides:
//! - `KeyValueStore`, a string key-value store bound to one [`Namespace`]
//! - `NonceStore`, whose `verify_and_delete` is an atomic compare-and-delete
//! - `AccountStore`, whose `create_account` is an atomic insert-if-absent
//! - in-memory backends (`MemoryKeyValueStore`, `MemoryAuthStore`)
//! - a file-backed `FileKeyValueStore` writing one JSON document per namespace
//!
//! Handles are passed explicitly to each engine; there is no ambient global
//! storage.

#![deny(missing_docs)]

/// Server-side account record.
pub mod account;
/// Error types for store operations.
pub mod error;
/// JSON-file-backed key-value store.
pub mod file;
/// In-memory backends.
pub mod memory;
/// Storage namespaces.
pub mod namespace;
/// Storage backend traits.
pub mod traits;

pub use account::Account;
pub use error::StoreError;
pub use file::FileKeyValueStore;
pub use memory::{MemoryAuthStore, MemoryKeyValueStore};
pub use namespace::Namespace;
pub use traits::{AccountStore, KeyValueStore, NonceStore};
