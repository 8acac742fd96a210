//! Key capability model and trust delegation engine for rootsig.
//!
//! This crate provides:
//! - the [`Authenticator`] collaborator trait and an in-process [`VirtualAuthenticator`]
//! - [`KeyPair`]: authenticator-backed, software, and delegated keys behind one enum
//! - [`RootKeySet`]: full-set quorum add/remove of root keys
//! - [`NodeKeyList`]: node keys trusted by a single root key signature
//! - [`verify_chain`]: checks signatures from root-endorsed ephemeral keys
//!
//! Core invariants:
//! - `verify(m, sign(m))` holds for every key that can verify
//! - verifiers return `Ok(false)` on mismatch and `Err` only for undecodable input
//! - every stored key list is re-verified on load
//!
#![deny(missing_docs)]

/// Platform authenticator collaborator.
pub mod authenticator;
/// Error types for key and trust operations.
pub mod errors;
/// Key capability model.
pub mod keys;
/// Trust delegation engine.
pub mod trust;

pub use authenticator::{
    Assertion, Authenticator, AuthenticatorError, Credential, VirtualAuthenticator,
};
pub use errors::{KeyError, TrustError};
pub use keys::{
    AuthenticatorKeyPair, AuthenticatorVerifier, DelegatedKeyPair, KeyKind, KeyPair,
    PublicKeyVerifier, Signer, SoftwareKeyPair, SoftwareVerifier, Verifier,
};
pub use trust::{
    delegate, verify_chain, verify_chain_with, ExportedState, NodeKeyEntry, NodeKeyList,
    RootKeyEntry, RootKeyProposal, RootKeySession, RootKeySet,
};
