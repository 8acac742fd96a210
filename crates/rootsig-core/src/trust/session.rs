//! Root key sessions that survive without local storage.
//!
//! A session is exported as a small JSON document holding only the root
//! key's public half. Importing it on another client asks the authenticator to
//! endorse a fresh in-memory key, so later signing needs no user presence.

use std::sync::Arc;

use rootsig_codec::encoding::base64_field;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::authenticator::Authenticator;
use crate::errors::{KeyError, TrustError};
use crate::keys::{AuthenticatorKeyPair, DelegatedKeyPair, Signer, SoftwareKeyPair, Verifier};

/// User id given to session root keys.
pub const ROOT_KEY_USER_ID: &str = "root-key";
/// User id given to the in-memory key created on import.
pub const TEMP_KEY_USER_ID: &str = "in-memory-temp-key";

/// Portable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedState {
    /// SPKI of the root key.
    #[serde(with = "base64_field")]
    pub public_root_key: Vec<u8>,
    /// Authenticator credential id of the root key.
    #[serde(with = "base64_field")]
    pub root_key_id: Vec<u8>,
    /// Admin keys endorsed by the root key. Always empty on export.
    #[serde(default)]
    pub admin_keys: Vec<ExportedAdminKey>,
}

/// An admin key entry in exported state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAdminKey {
    /// Display name.
    pub nickname: String,
    /// SPKI of the admin key.
    #[serde(with = "base64_field")]
    pub public_key: Vec<u8>,
    /// Key id of the admin key.
    #[serde(with = "base64_field")]
    pub key_id: Vec<u8>,
    /// When the root key endorsed it.
    pub timestamp: String,
    /// Root key's signature over the admin key.
    pub root_key_signature: String,
}

/// A root key held by an authenticator without any local key store.
#[derive(Debug, Clone)]
pub struct RootKeySession {
    root_key: AuthenticatorKeyPair,
}

impl RootKeySession {
    /// Creates a fresh root credential, embedding `challenge` in its creation data.
    pub async fn create(
        authenticator: Arc<dyn Authenticator>,
        challenge: &[u8],
    ) -> Result<Self, TrustError> {
        let root_key =
            AuthenticatorKeyPair::create(authenticator, None, ROOT_KEY_USER_ID, challenge).await?;
        Ok(Self { root_key })
    }

    /// Wraps an existing root key.
    pub fn new(root_key: AuthenticatorKeyPair) -> Self {
        Self { root_key }
    }

    /// The root key.
    pub fn root_key(&self) -> &AuthenticatorKeyPair {
        &self.root_key
    }

    /// SPKI of the root key.
    pub fn root_public_key(&self) -> &[u8] {
        self.root_key.public_key()
    }

    /// Portable state for this session.
    pub fn export_state(&self) -> ExportedState {
        ExportedState {
            public_root_key: self.root_key.public_key().to_vec(),
            root_key_id: self.root_key.key_id().to_vec(),
            admin_keys: Vec::new(),
        }
    }

    /// [`export_state`](Self::export_state) as JSON.
    pub fn export_json(&self) -> Result<String, TrustError> {
        Ok(serde_json::to_string(&self.export_state())?)
    }

    /// Re-establishes a session from exported JSON.
    ///
    /// Asks the authenticator once to endorse a new in-memory key and checks
    /// the endorsement against the exported public key before returning the
    /// delegated signer.
    pub async fn import_state(
        json: &str,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<(Self, DelegatedKeyPair), TrustError> {
        let state: ExportedState = serde_json::from_str(json)?;
        let root_key = AuthenticatorKeyPair::from_parts(
            authenticator,
            None,
            ROOT_KEY_USER_ID,
            state.root_key_id,
            state.public_root_key,
        )?;

        let temp = SoftwareKeyPair::generate(TEMP_KEY_USER_ID)?;
        let endorsement = root_key.sign(temp.public_key()).await?;
        if !root_key.verify(temp.public_key(), &endorsement)? {
            return Err(TrustError::SignatureInvalid(
                "authenticator endorsement does not match the exported root key".to_string(),
            ));
        }
        info!(event = "session_imported", admin_keys = state.admin_keys.len());

        Ok((Self { root_key }, DelegatedKeyPair::new(temp, endorsement)))
    }

    /// Signs with the root key.
    pub async fn sign_payload(&self, message: &[u8]) -> Result<String, KeyError> {
        self.root_key.sign(message).await
    }

    /// Verifies a root key signature.
    pub fn verify_payload(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        self.root_key.verify(message, signature)
    }
}
