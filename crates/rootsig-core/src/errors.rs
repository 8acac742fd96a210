use rootsig_codec::CodecError;
use rootsig_store::StoreError;
use thiserror::Error;

use crate::authenticator::AuthenticatorError;

/// Errors raised by key pairs and verifiers.
///
/// A signature that decodes but does not match is never an error; verifiers
/// report it as `Ok(false)`.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The signature string could not be decoded into the expected shape.
    #[error("malformed signature: {0}")]
    MalformedSignature(#[from] CodecError),
    /// The SPKI bytes are not a P-256 public key.
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    /// The key variant does not offer this capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    /// The authenticator collaborator failed.
    #[error("authenticator error: {0}")]
    Authenticator(#[from] AuthenticatorError),
    /// Persisting or loading a key record failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        KeyError::Storage(StoreError::Serialization(err))
    }
}

/// Errors raised by the trust delegation engine.
#[derive(Error, Debug)]
pub enum TrustError {
    /// The number of signatures does not match the number of keys.
    #[error("quorum mismatch: expected {expected} signatures, got {found}")]
    QuorumMismatch {
        /// Keys in the proposed set.
        expected: usize,
        /// Signatures supplied.
        found: usize,
    },
    /// A signature over a key list did not verify.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),
    /// No root key with this user id.
    #[error("unknown key id '{0}'")]
    UnknownKeyId(String),
    /// A root key with this user id is already present.
    #[error("duplicate key id '{0}'")]
    DuplicateKeyId(String),
    /// The signer of a node key list is not in the root key set.
    #[error("untrusted signer '{0}'")]
    UntrustedSigner(String),
    /// Removing the key would leave the root key set empty.
    #[error("cannot remove the last root key")]
    LastRootKey,
    /// A stored record declares a schema version this build does not read.
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u32),
    /// A stored record or exported state is not valid JSON of the expected shape.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
    /// Canonical serialization of a key list failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(String),
    /// A key operation failed.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
