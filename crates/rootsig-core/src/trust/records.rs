//! Versioned, signed key list records.
//!
//! A key list is serialized as canonical JSON `{"keys":[...],"version":1}` and
//! that exact string is what every signature covers. The string is stored
//! verbatim inside the record so verification never depends on re-serializing.

use rootsig_codec::encoding::base64_field;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{KeyError, TrustError};
use crate::keys::{KeyKind, KeyPair, PublicKeyVerifier, SoftwareVerifier};

/// Schema version written by this build and the only one it reads.
pub const RECORD_VERSION: u32 = 1;

/// Store key holding the record within its namespace.
pub(crate) const RECORD_KEY: &str = "payload";

/// Public identity of a root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootKeyEntry {
    /// User id; unique within the set.
    pub user_id: String,
    /// Signature format the key produces.
    pub kind: KeyKind,
    /// Opaque key id.
    #[serde(with = "base64_field")]
    pub key_id: Vec<u8>,
    /// SPKI-encoded public key.
    #[serde(with = "base64_field")]
    pub public_key: Vec<u8>,
}

impl RootKeyEntry {
    /// Public identity of `key`. Delegated keys cannot be root keys.
    pub fn from_key_pair(key: &KeyPair) -> Result<Self, KeyError> {
        if key.kind() == KeyKind::Delegated {
            return Err(KeyError::UnsupportedOperation(
                "delegated keys cannot join the root key set",
            ));
        }
        Ok(Self {
            user_id: key.user_id().to_string(),
            kind: key.kind(),
            key_id: key.key_id().to_vec(),
            public_key: key.public_key().to_vec(),
        })
    }

    /// Verifier for signatures made by this key.
    pub fn verifier(&self) -> Result<PublicKeyVerifier, KeyError> {
        PublicKeyVerifier::from_spki(self.kind, &self.public_key)
    }

    /// Whether `key` is the key pair this entry describes.
    pub fn matches(&self, key: &KeyPair) -> bool {
        self.user_id == key.user_id() && self.public_key == key.public_key()
    }
}

/// A node key trusted by a root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKeyEntry {
    /// Human-readable name; a UUID for locally generated keys.
    pub nickname: String,
    /// SPKI-encoded public key.
    #[serde(with = "base64_field")]
    pub public_key: Vec<u8>,
}

impl NodeKeyEntry {
    /// Verifier for signatures made by this node key.
    pub fn verifier(&self) -> Result<SoftwareVerifier, KeyError> {
        SoftwareVerifier::from_spki(&self.public_key)
    }
}

/// Stored root key set: the payload and one signature per key, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootKeyRecord {
    /// Schema version.
    pub version: u32,
    /// Canonical JSON of the key list.
    pub payload: String,
    /// Signatures over `payload`, one per key.
    pub signatures: Vec<String>,
}

/// Stored node key list, signed by a single root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKeyRecord {
    /// Schema version.
    pub version: u32,
    /// Canonical JSON of the key list.
    pub payload: String,
    /// Signature over `payload`.
    pub signature: String,
    /// User id of the signing root key.
    pub signed_by_id: String,
}

#[derive(Serialize)]
struct KeyListRef<'a, T> {
    version: u32,
    keys: &'a [T],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyList<T> {
    version: u32,
    keys: Vec<T>,
}

pub(crate) fn check_version(version: u32) -> Result<(), TrustError> {
    if version != RECORD_VERSION {
        return Err(TrustError::UnsupportedVersion(version));
    }
    Ok(())
}

pub(crate) fn encode_key_list<T: Serialize>(keys: &[T]) -> Result<String, TrustError> {
    let value = serde_json::to_value(KeyListRef {
        version: RECORD_VERSION,
        keys,
    })?;
    canonical_json::to_string(&value).map_err(|e| TrustError::Canonicalization(e.to_string()))
}

pub(crate) fn decode_key_list<T: DeserializeOwned>(payload: &str) -> Result<Vec<T>, TrustError> {
    let list: KeyList<T> = serde_json::from_str(payload)?;
    check_version(list.version)?;
    Ok(list.keys)
}
