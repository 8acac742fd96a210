//! Node key list signed by one root key.
//!
//! The whole list is re-signed on every append; there is no merge, so
//! concurrent appends lose all but the last write.

use rootsig_store::KeyValueStore;
use tracing::{info, warn};
use uuid::Uuid;

use super::records::{
    check_version, decode_key_list, encode_key_list, NodeKeyEntry, NodeKeyRecord, RECORD_KEY,
    RECORD_VERSION,
};
use super::root_keys::RootKeySet;
use crate::errors::TrustError;
use crate::keys::{KeyPair, SoftwareKeyPair, Signer, Verifier};

/// Verified list of trusted node keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeKeyList {
    entries: Vec<NodeKeyEntry>,
    signed_by_id: Option<String>,
}

impl NodeKeyList {
    /// Loads the stored list and checks it was signed by a member of `root_keys`.
    ///
    /// Nothing stored yields an empty list.
    pub async fn load(
        store: &dyn KeyValueStore,
        root_keys: &RootKeySet,
    ) -> Result<Self, TrustError> {
        let Some(raw) = store.load(RECORD_KEY).await? else {
            return Ok(Self::default());
        };
        let record: NodeKeyRecord = serde_json::from_str(&raw)?;
        check_version(record.version)?;

        let signer = root_keys.get(&record.signed_by_id).ok_or_else(|| {
            warn!(event = "node_keys_untrusted", signed_by = %record.signed_by_id);
            TrustError::UntrustedSigner(record.signed_by_id.clone())
        })?;
        if !signer
            .verifier()?
            .verify(record.payload.as_bytes(), &record.signature)?
        {
            warn!(event = "node_keys_rejected", signed_by = %record.signed_by_id);
            return Err(TrustError::SignatureInvalid(format!(
                "node key list signature by '{}' does not verify",
                record.signed_by_id
            )));
        }

        Ok(Self {
            entries: decode_key_list(&record.payload)?,
            signed_by_id: Some(record.signed_by_id),
        })
    }

    /// Appends `entry` to the stored list and re-signs it with `signing_root_key`.
    pub async fn append(
        store: &dyn KeyValueStore,
        root_keys: &RootKeySet,
        entry: NodeKeyEntry,
        signing_root_key: &KeyPair,
    ) -> Result<Self, TrustError> {
        let trusted = root_keys
            .get(signing_root_key.user_id())
            .is_some_and(|k| k.matches(signing_root_key));
        if !trusted {
            return Err(TrustError::UntrustedSigner(
                signing_root_key.user_id().to_string(),
            ));
        }

        let mut list = Self::load(store, root_keys).await?;
        list.entries.push(entry);

        let payload = encode_key_list(&list.entries)?;
        let record = NodeKeyRecord {
            version: RECORD_VERSION,
            signature: signing_root_key.sign(payload.as_bytes()).await?,
            payload,
            signed_by_id: signing_root_key.user_id().to_string(),
        };
        store
            .store(RECORD_KEY, &serde_json::to_string(&record)?)
            .await?;
        info!(
            event = "node_key_appended",
            signed_by = %record.signed_by_id,
            count = list.entries.len()
        );

        list.signed_by_id = Some(record.signed_by_id);
        Ok(list)
    }

    /// Generates a software node key named by a fresh UUID and appends it.
    pub async fn create_local_node_key(
        store: &dyn KeyValueStore,
        root_keys: &RootKeySet,
        signing_root_key: &KeyPair,
    ) -> Result<SoftwareKeyPair, TrustError> {
        let nickname = Uuid::new_v4().to_string();
        let key = SoftwareKeyPair::generate(nickname.clone())?;
        let entry = NodeKeyEntry {
            nickname,
            public_key: key.public_key().to_vec(),
        };
        Self::append(store, root_keys, entry, signing_root_key).await?;
        Ok(key)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[NodeKeyEntry] {
        &self.entries
    }

    /// Looks up an entry by nickname.
    pub fn find(&self, nickname: &str) -> Option<&NodeKeyEntry> {
        self.entries.iter().find(|e| e.nickname == nickname)
    }

    /// User id of the root key that signed the stored list.
    pub fn signed_by_id(&self) -> Option<&str> {
        self.signed_by_id.as_deref()
    }
}
