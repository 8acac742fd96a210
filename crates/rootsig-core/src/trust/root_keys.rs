//! Root key set with full-set quorum mutations.
//!
//! Every mutation produces a new key list that each key of the resulting set
//! must sign: adding a key needs the n existing keys plus the new one, removing
//! a key needs the n-1 that remain. The first key of an empty set signs alone.
//!
//! Mutations are not serialized against each other. Two writers racing on the
//! same store both succeed and the last write wins.

use rootsig_store::KeyValueStore;
use tracing::{debug, info, warn};

use super::records::{
    check_version, decode_key_list, encode_key_list, RootKeyEntry, RootKeyRecord, RECORD_KEY,
    RECORD_VERSION,
};
use crate::errors::TrustError;
use crate::keys::{KeyPair, Signer, Verifier};

/// A candidate key list awaiting signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootKeyProposal {
    keys: Vec<RootKeyEntry>,
    payload: String,
}

impl RootKeyProposal {
    fn new(keys: Vec<RootKeyEntry>) -> Result<Self, TrustError> {
        let payload = encode_key_list(&keys)?;
        Ok(Self { keys, payload })
    }

    /// Keys of the proposed set; also the required signers, in signature order.
    pub fn keys(&self) -> &[RootKeyEntry] {
        &self.keys
    }

    /// Exact bytes every signer must sign.
    pub fn payload(&self) -> &[u8] {
        self.payload.as_bytes()
    }
}

/// The current root of trust.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootKeySet {
    keys: Vec<RootKeyEntry>,
    payload: String,
    signatures: Vec<String>,
}

impl RootKeySet {
    /// An empty set, ready for bootstrap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in signature order.
    pub fn keys(&self) -> &[RootKeyEntry] {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set has no keys yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Looks up a key by user id.
    pub fn get(&self, user_id: &str) -> Option<&RootKeyEntry> {
        self.keys.iter().find(|k| k.user_id == user_id)
    }

    /// The record that [`save`](Self::save) writes.
    pub fn record(&self) -> RootKeyRecord {
        RootKeyRecord {
            version: RECORD_VERSION,
            payload: self.payload.clone(),
            signatures: self.signatures.clone(),
        }
    }

    /// Proposes the current set plus `entry`.
    pub fn propose_add(&self, entry: RootKeyEntry) -> Result<RootKeyProposal, TrustError> {
        if self.get(&entry.user_id).is_some() {
            return Err(TrustError::DuplicateKeyId(entry.user_id));
        }
        let mut keys = self.keys.clone();
        keys.push(entry);
        RootKeyProposal::new(keys)
    }

    /// Proposes the current set without `user_id`.
    pub fn propose_remove(&self, user_id: &str) -> Result<RootKeyProposal, TrustError> {
        if self.get(user_id).is_none() {
            return Err(TrustError::UnknownKeyId(user_id.to_string()));
        }
        if self.keys.len() == 1 {
            return Err(TrustError::LastRootKey);
        }
        let keys = self
            .keys
            .iter()
            .filter(|k| k.user_id != user_id)
            .cloned()
            .collect();
        RootKeyProposal::new(keys)
    }

    /// Adopts `proposal` if `signatures` holds one valid signature per key, in order.
    pub fn commit(
        &mut self,
        proposal: RootKeyProposal,
        signatures: Vec<String>,
    ) -> Result<(), TrustError> {
        verify_quorum(&proposal.keys, proposal.payload(), &signatures)?;
        info!(
            event = "root_keys_committed",
            before = self.keys.len(),
            after = proposal.keys.len()
        );
        self.keys = proposal.keys;
        self.payload = proposal.payload;
        self.signatures = signatures;
        Ok(())
    }

    /// Adds `new_key`, collecting signatures from `signers` and `new_key`, and saves.
    ///
    /// On an empty set this is the bootstrap: `new_key` signs alone.
    pub async fn add_key(
        &mut self,
        store: &dyn KeyValueStore,
        new_key: &KeyPair,
        signers: &[KeyPair],
    ) -> Result<(), TrustError> {
        let proposal = self.propose_add(RootKeyEntry::from_key_pair(new_key)?)?;
        let signatures = collect_signatures(&proposal, signers, Some(new_key)).await?;
        self.commit(proposal, signatures)?;
        self.save(store).await
    }

    /// Removes `user_id`, collecting signatures from the remaining keys in `signers`, and saves.
    pub async fn remove_key(
        &mut self,
        store: &dyn KeyValueStore,
        user_id: &str,
        signers: &[KeyPair],
    ) -> Result<(), TrustError> {
        let proposal = self.propose_remove(user_id)?;
        let signatures = collect_signatures(&proposal, signers, None).await?;
        self.commit(proposal, signatures)?;
        self.save(store).await
    }

    /// Creates and saves a one-key set.
    pub async fn bootstrap(store: &dyn KeyValueStore, first: &KeyPair) -> Result<Self, TrustError> {
        let mut set = Self::new();
        set.add_key(store, first, &[]).await?;
        Ok(set)
    }

    /// Loads and fully re-verifies the stored set. Nothing stored yields an empty set.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, TrustError> {
        let Some(raw) = store.load(RECORD_KEY).await? else {
            debug!(event = "root_keys_absent");
            return Ok(Self::new());
        };
        let record: RootKeyRecord = serde_json::from_str(&raw)?;
        check_version(record.version)?;
        let keys: Vec<RootKeyEntry> = decode_key_list(&record.payload)?;
        if let Err(e) = verify_quorum(&keys, record.payload.as_bytes(), &record.signatures) {
            warn!(event = "root_keys_rejected", error = %e);
            return Err(e);
        }
        Ok(Self {
            keys,
            payload: record.payload,
            signatures: record.signatures,
        })
    }

    /// Writes the current record, or clears the slot if the set is empty.
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), TrustError> {
        if self.keys.is_empty() {
            store.remove(RECORD_KEY).await?;
            return Ok(());
        }
        store
            .store(RECORD_KEY, &serde_json::to_string(&self.record())?)
            .await?;
        Ok(())
    }
}

fn verify_quorum(
    keys: &[RootKeyEntry],
    payload: &[u8],
    signatures: &[String],
) -> Result<(), TrustError> {
    if keys.is_empty() || signatures.len() != keys.len() {
        return Err(TrustError::QuorumMismatch {
            expected: keys.len(),
            found: signatures.len(),
        });
    }
    for (key, signature) in keys.iter().zip(signatures) {
        if !key.verifier()?.verify(payload, signature)? {
            return Err(TrustError::SignatureInvalid(format!(
                "root key '{}' did not sign the key list",
                key.user_id
            )));
        }
    }
    Ok(())
}

/// Signs `proposal` with the key pair matching each required key, in order.
async fn collect_signatures(
    proposal: &RootKeyProposal,
    signers: &[KeyPair],
    extra: Option<&KeyPair>,
) -> Result<Vec<String>, TrustError> {
    let mut signatures = Vec::with_capacity(proposal.keys.len());
    for entry in &proposal.keys {
        let signer = signers
            .iter()
            .chain(extra)
            .find(|k| entry.matches(k))
            .ok_or_else(|| TrustError::QuorumMismatch {
                expected: proposal.keys.len(),
                found: signatures.len(),
            })?;
        signatures.push(signer.sign(proposal.payload()).await?);
    }
    Ok(signatures)
}
