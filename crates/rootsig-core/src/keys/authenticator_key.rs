use std::sync::Arc;

use async_trait::async_trait;
use rootsig_codec::encoding::base64_field;
use rootsig_codec::{der_to_compact, CompactSignature};
use rootsig_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::verifier::AuthenticatorVerifier;
use super::{Signer, Verifier};
use crate::authenticator::Authenticator;
use crate::errors::KeyError;

/// Persisted form of an authenticator-backed key pair.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredKeyPair {
    user_id: String,
    #[serde(with = "base64_field")]
    key_id: Vec<u8>,
    #[serde(with = "base64_field")]
    spki: Vec<u8>,
}

/// Key pair whose private half lives in a platform authenticator.
///
/// Signing asks the authenticator for an assertion over the message and
/// returns it as a compact signature string. Without a key store the pair is
/// usable but cannot be saved.
#[derive(Clone)]
pub struct AuthenticatorKeyPair {
    user_id: String,
    key_id: Vec<u8>,
    public_key: Vec<u8>,
    verifier: AuthenticatorVerifier,
    authenticator: Arc<dyn Authenticator>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl AuthenticatorKeyPair {
    /// Creates a new credential with `challenge` embedded in its client data.
    pub async fn create(
        authenticator: Arc<dyn Authenticator>,
        storage: Option<Arc<dyn KeyValueStore>>,
        user_id: &str,
        challenge: &[u8],
    ) -> Result<Self, KeyError> {
        let credential = authenticator.create_credential(challenge, user_id).await?;
        debug!(event = "authenticator_key_created", user_id);
        Self::from_parts(
            authenticator,
            storage,
            user_id,
            credential.key_id,
            credential.public_key_spki,
        )
    }

    /// Rebuilds a key pair from a known credential id and public key.
    pub fn from_parts(
        authenticator: Arc<dyn Authenticator>,
        storage: Option<Arc<dyn KeyValueStore>>,
        user_id: impl Into<String>,
        key_id: Vec<u8>,
        public_key: Vec<u8>,
    ) -> Result<Self, KeyError> {
        let verifier = AuthenticatorVerifier::from_spki(&public_key)?;
        Ok(Self {
            user_id: user_id.into(),
            key_id,
            public_key,
            verifier,
            authenticator,
            storage,
        })
    }

    /// Loads the key pair saved under `user_id`, if any.
    pub async fn load(
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn KeyValueStore>,
        user_id: &str,
    ) -> Result<Option<Self>, KeyError> {
        let Some(raw) = storage.load(user_id).await? else {
            return Ok(None);
        };
        let stored: StoredKeyPair = serde_json::from_str(&raw)?;
        Self::from_parts(
            authenticator,
            Some(storage),
            stored.user_id,
            stored.key_id,
            stored.spki,
        )
        .map(Some)
    }

    /// Loads every key pair saved in `storage`, ordered by user id.
    pub async fn load_all(
        authenticator: Arc<dyn Authenticator>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Vec<Self>, KeyError> {
        let mut pairs = Vec::new();
        for user_id in storage.keys().await? {
            if let Some(pair) =
                Self::load(Arc::clone(&authenticator), Arc::clone(&storage), &user_id).await?
            {
                pairs.push(pair);
            }
        }
        Ok(pairs)
    }

    /// Persists `{userId, keyId, spki}` under the user id.
    pub async fn save(&self) -> Result<(), KeyError> {
        let storage = self.storage.as_ref().ok_or(KeyError::UnsupportedOperation(
            "saving not supported without a key store",
        ))?;
        let record = StoredKeyPair {
            user_id: self.user_id.clone(),
            key_id: self.key_id.clone(),
            spki: self.public_key.clone(),
        };
        storage
            .store(&self.user_id, &serde_json::to_string(&record)?)
            .await?;
        Ok(())
    }

    /// User id the credential was created for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Authenticator credential id.
    pub fn key_id(&self) -> &[u8] {
        &self.key_id
    }

    /// SPKI-encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl std::fmt::Debug for AuthenticatorKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorKeyPair")
            .field("user_id", &self.user_id)
            .field("key_id", &self.key_id)
            .field("stored", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for AuthenticatorKeyPair {
    async fn sign(&self, message: &[u8]) -> Result<String, KeyError> {
        let assertion = self
            .authenticator
            .get_assertion(message, Some(&self.key_id))
            .await?;
        let compact = CompactSignature {
            authenticator_data: assertion.authenticator_data,
            client_data_json: assertion.client_data_json,
            signature: der_to_compact(&assertion.signature)?,
        };
        Ok(compact.encode())
    }
}

impl Verifier for AuthenticatorKeyPair {
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        self.verifier.verify(message, signature)
    }
}
