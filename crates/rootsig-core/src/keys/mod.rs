//! Key capability model.
//!
//! Every key can sign; most can verify. The three backends are a closed set
//! ([`KeyPair`]) so callers match on them instead of probing for capabilities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::KeyError;

mod authenticator_key;
mod delegated;
mod software;
mod verifier;

pub use authenticator_key::AuthenticatorKeyPair;
pub use delegated::DelegatedKeyPair;
pub use software::SoftwareKeyPair;
pub use verifier::{import_spki, AuthenticatorVerifier, PublicKeyVerifier, SoftwareVerifier};

/// Produces signature strings. May suspend waiting for the user.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `message`, returning the backend's signature string.
    async fn sign(&self, message: &[u8]) -> Result<String, KeyError>;
}

/// Checks signature strings.
pub trait Verifier {
    /// Returns `Ok(false)` when `signature` does not match `message`, and
    /// `Err(KeyError::MalformedSignature)` when it cannot be decoded at all.
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError>;
}

/// Which backend a public key belongs to, and so which signature format it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Platform authenticator; compact three-part signatures.
    Authenticator,
    /// In-memory P-256; base64 `r || s`.
    Software,
    /// Root-endorsed ephemeral key; chained signatures.
    Delegated,
}

/// A key pair of any backend.
#[derive(Debug, Clone)]
pub enum KeyPair {
    /// Backed by a platform authenticator.
    Authenticator(AuthenticatorKeyPair),
    /// Held in process memory.
    Software(SoftwareKeyPair),
    /// Ephemeral key endorsed by a root key.
    Delegated(DelegatedKeyPair),
}

impl KeyPair {
    /// Backend kind.
    pub fn kind(&self) -> KeyKind {
        match self {
            KeyPair::Authenticator(_) => KeyKind::Authenticator,
            KeyPair::Software(_) => KeyKind::Software,
            KeyPair::Delegated(_) => KeyKind::Delegated,
        }
    }

    /// User id the key was created for.
    pub fn user_id(&self) -> &str {
        match self {
            KeyPair::Authenticator(k) => k.user_id(),
            KeyPair::Software(k) => k.user_id(),
            KeyPair::Delegated(k) => k.inner().user_id(),
        }
    }

    /// Opaque key id.
    pub fn key_id(&self) -> &[u8] {
        match self {
            KeyPair::Authenticator(k) => k.key_id(),
            KeyPair::Software(k) => k.key_id(),
            KeyPair::Delegated(k) => k.inner().key_id(),
        }
    }

    /// SPKI-encoded public key.
    pub fn public_key(&self) -> &[u8] {
        match self {
            KeyPair::Authenticator(k) => k.public_key(),
            KeyPair::Software(k) => k.public_key(),
            KeyPair::Delegated(k) => k.inner().public_key(),
        }
    }

    /// Verifies a signature made by this key.
    ///
    /// Delegated keys are signers only and fail with `UnsupportedOperation`.
    pub fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        match self {
            KeyPair::Authenticator(k) => k.verify(message, signature),
            KeyPair::Software(k) => k.verify(message, signature),
            KeyPair::Delegated(_) => Err(KeyError::UnsupportedOperation(
                "delegated keys cannot verify signatures",
            )),
        }
    }

    /// Persists the key pair.
    ///
    /// Software keys are never persisted and fail with `UnsupportedOperation`.
    /// Saving a delegated key is a no-op: it only lives for the session.
    pub async fn save(&self) -> Result<(), KeyError> {
        match self {
            KeyPair::Authenticator(k) => k.save().await,
            KeyPair::Software(_) => Err(KeyError::UnsupportedOperation(
                "software keys are never persisted",
            )),
            KeyPair::Delegated(_) => Ok(()),
        }
    }
}

#[async_trait]
impl Signer for KeyPair {
    async fn sign(&self, message: &[u8]) -> Result<String, KeyError> {
        match self {
            KeyPair::Authenticator(k) => k.sign(message).await,
            KeyPair::Software(k) => k.sign(message).await,
            KeyPair::Delegated(k) => k.sign(message).await,
        }
    }
}

impl From<AuthenticatorKeyPair> for KeyPair {
    fn from(k: AuthenticatorKeyPair) -> Self {
        KeyPair::Authenticator(k)
    }
}

impl From<SoftwareKeyPair> for KeyPair {
    fn from(k: SoftwareKeyPair) -> Self {
        KeyPair::Software(k)
    }
}

impl From<DelegatedKeyPair> for KeyPair {
    fn from(k: DelegatedKeyPair) -> Self {
        KeyPair::Delegated(k)
    }
}
