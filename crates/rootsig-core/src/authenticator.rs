//! Platform authenticator collaborator.
//!
//! The core never holds an authenticator-backed private key; it asks an
//! [`Authenticator`] to create credentials and to sign challenges. The
//! [`VirtualAuthenticator`] is an in-process stand-in that behaves like a
//! WebAuthn platform authenticator and is what the tests and CLI use.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::EncodePublicKey;
use rand::rngs::OsRng;
use rand::RngCore;
use rootsig_codec::{ClientData, CEREMONY_CREATE, CEREMONY_GET};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Authenticator data flags: user present and user verified.
const FLAGS_UP_UV: u8 = 0x05;
const KEY_ID_LEN: usize = 16;

/// Result of creating a new credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Credential id chosen by the authenticator.
    pub key_id: Vec<u8>,
    /// SPKI-encoded P-256 public key.
    pub public_key_spki: Vec<u8>,
    /// Client data JSON embedding the creation challenge.
    pub client_data_json: Vec<u8>,
    /// Raw authenticator data.
    pub authenticator_data: Vec<u8>,
}

/// Result of asking an authenticator to sign a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Credential that produced the signature.
    pub key_id: Vec<u8>,
    /// DER-encoded ECDSA signature over `authenticator_data || SHA-256(client_data_json)`.
    pub signature: Vec<u8>,
    /// Raw authenticator data.
    pub authenticator_data: Vec<u8>,
    /// Client data JSON embedding the challenge.
    pub client_data_json: Vec<u8>,
}

/// Failures reported by an authenticator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// The user dismissed the presence prompt.
    #[error("user cancelled the operation")]
    UserCancelled,
    /// No authenticator is reachable.
    #[error("no authenticator available")]
    NoAuthenticatorAvailable,
    /// The requested credential is not held by this authenticator.
    #[error("unknown credential")]
    UnknownCredential,
    /// Any other authenticator failure.
    #[error("authenticator failure: {0}")]
    Failed(String),
}

/// Capability to create credentials and sign challenges with them.
///
/// Calls may suspend indefinitely while waiting for the user.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Creates a new credential for `user_id`, embedding `challenge` in the client data.
    async fn create_credential(
        &self,
        challenge: &[u8],
        user_id: &str,
    ) -> Result<Credential, AuthenticatorError>;

    /// Signs `challenge` with `key_id`, or with a credential of the
    /// authenticator's choosing when `key_id` is `None`.
    async fn get_assertion(
        &self,
        challenge: &[u8],
        key_id: Option<&[u8]>,
    ) -> Result<Assertion, AuthenticatorError>;
}

struct VirtualCredential {
    key_id: Vec<u8>,
    user_id: String,
    signing_key: SigningKey,
}

/// In-process software authenticator producing WebAuthn-shaped assertions.
pub struct VirtualAuthenticator {
    origin: String,
    rp_id_hash: [u8; 32],
    credentials: RwLock<Vec<VirtualCredential>>,
    counter: AtomicU32,
    available: AtomicBool,
    user_present: AtomicBool,
}

impl VirtualAuthenticator {
    /// Creates an authenticator for relying party `rp_id`.
    pub fn new(rp_id: &str) -> Self {
        Self {
            origin: format!("https://{rp_id}"),
            rp_id_hash: Sha256::digest(rp_id.as_bytes()).into(),
            credentials: RwLock::new(Vec::new()),
            counter: AtomicU32::new(0),
            available: AtomicBool::new(true),
            user_present: AtomicBool::new(true),
        }
    }

    /// Registers an existing private key as a credential; returns its key id.
    pub fn import_credential(
        &self,
        user_id: &str,
        signing_key: SigningKey,
    ) -> Result<Vec<u8>, AuthenticatorError> {
        let mut key_id = vec![0u8; KEY_ID_LEN];
        OsRng.fill_bytes(&mut key_id);
        self.credentials
            .write()
            .map_err(|_| AuthenticatorError::Failed("credential table poisoned".to_string()))?
            .push(VirtualCredential {
                key_id: key_id.clone(),
                user_id: user_id.to_string(),
                signing_key,
            });
        Ok(key_id)
    }

    /// Simulates the user declining (`false`) or accepting presence prompts.
    pub fn set_user_present(&self, present: bool) {
        self.user_present.store(present, Ordering::SeqCst);
    }

    /// Simulates the authenticator being unplugged.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of credentials held.
    pub fn credential_count(&self) -> usize {
        self.credentials.read().map(|c| c.len()).unwrap_or(0)
    }

    fn check_ready(&self) -> Result<(), AuthenticatorError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(AuthenticatorError::NoAuthenticatorAvailable);
        }
        if !self.user_present.load(Ordering::SeqCst) {
            return Err(AuthenticatorError::UserCancelled);
        }
        Ok(())
    }

    fn authenticator_data(&self) -> Vec<u8> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.rp_id_hash);
        data.push(FLAGS_UP_UV);
        data.extend_from_slice(&count.to_be_bytes());
        data
    }

    fn client_data(&self, ceremony: &str, challenge: &[u8]) -> Result<Vec<u8>, AuthenticatorError> {
        ClientData::new(ceremony, challenge, self.origin.clone())
            .to_json()
            .map_err(|e| AuthenticatorError::Failed(e.to_string()))
    }
}

impl std::fmt::Debug for VirtualAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualAuthenticator")
            .field("origin", &self.origin)
            .field("credentials", &self.credential_count())
            .finish()
    }
}

#[async_trait]
impl Authenticator for VirtualAuthenticator {
    async fn create_credential(
        &self,
        challenge: &[u8],
        user_id: &str,
    ) -> Result<Credential, AuthenticatorError> {
        self.check_ready()?;
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key_spki = signing_key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| AuthenticatorError::Failed(e.to_string()))?
            .as_bytes()
            .to_vec();
        let key_id = self.import_credential(user_id, signing_key)?;
        debug!(event = "credential_created", user_id, key_id_len = key_id.len());

        Ok(Credential {
            key_id,
            public_key_spki,
            client_data_json: self.client_data(CEREMONY_CREATE, challenge)?,
            authenticator_data: self.authenticator_data(),
        })
    }

    async fn get_assertion(
        &self,
        challenge: &[u8],
        key_id: Option<&[u8]>,
    ) -> Result<Assertion, AuthenticatorError> {
        self.check_ready()?;
        let credentials = self
            .credentials
            .read()
            .map_err(|_| AuthenticatorError::Failed("credential table poisoned".to_string()))?;
        let credential = match key_id {
            Some(id) => credentials.iter().find(|c| c.key_id == id),
            None => credentials.last(),
        }
        .ok_or(AuthenticatorError::UnknownCredential)?;

        let authenticator_data = self.authenticator_data();
        let client_data_json = self.client_data(CEREMONY_GET, challenge)?;
        let mut signed = authenticator_data.clone();
        signed.extend_from_slice(&Sha256::digest(&client_data_json));
        let signature: Signature = credential.signing_key.sign(&signed);
        debug!(event = "assertion_signed", user_id = %credential.user_id);

        Ok(Assertion {
            key_id: credential.key_id.clone(),
            signature: signature.to_der().as_bytes().to_vec(),
            authenticator_data,
            client_data_json,
        })
    }
}
