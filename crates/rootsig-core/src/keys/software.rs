use async_trait::async_trait;
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::EncodePublicKey;
use rand::rngs::OsRng;
use rootsig_codec::to_base64;
use sha2::{Digest, Sha256};

use super::verifier::SoftwareVerifier;
use super::{Signer, Verifier};
use crate::errors::KeyError;

const KEY_ID_LEN: usize = 16;

/// P-256 key pair held in process memory and never persisted.
///
/// Signatures are base64 `r || s` over the message itself. The key id is the
/// first 16 bytes of SHA-256 over the SPKI.
#[derive(Clone)]
pub struct SoftwareKeyPair {
    user_id: String,
    key_id: Vec<u8>,
    public_key: Vec<u8>,
    signing_key: SigningKey,
    verifier: SoftwareVerifier,
}

impl SoftwareKeyPair {
    /// Generates a fresh key pair.
    pub fn generate(user_id: impl Into<String>) -> Result<Self, KeyError> {
        Self::from_signing_key(user_id, SigningKey::random(&mut OsRng))
    }

    /// Wraps an existing private key.
    pub fn from_signing_key(
        user_id: impl Into<String>,
        signing_key: SigningKey,
    ) -> Result<Self, KeyError> {
        let verifying_key = signing_key.verifying_key().clone();
        let public_key = verifying_key
            .to_public_key_der()
            .map_err(|e| KeyError::MalformedPublicKey(e.to_string()))?
            .as_bytes()
            .to_vec();
        let key_id = Sha256::digest(&public_key)[..KEY_ID_LEN].to_vec();
        Ok(Self {
            user_id: user_id.into(),
            key_id,
            public_key,
            signing_key,
            verifier: SoftwareVerifier::from_key(verifying_key),
        })
    }

    /// User id this key was created for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Key id derived from the public key.
    pub fn key_id(&self) -> &[u8] {
        &self.key_id
    }

    /// SPKI-encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Signs synchronously; the async [`Signer`] impl delegates here.
    pub fn sign_now(&self, message: &[u8]) -> String {
        let signature: Signature = self.signing_key.sign(message);
        to_base64(&signature.to_bytes())
    }
}

impl std::fmt::Debug for SoftwareKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareKeyPair")
            .field("user_id", &self.user_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for SoftwareKeyPair {
    async fn sign(&self, message: &[u8]) -> Result<String, KeyError> {
        Ok(self.sign_now(message))
    }
}

impl Verifier for SoftwareKeyPair {
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        self.verifier.verify(message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_signature_only() {
        let key = SoftwareKeyPair::generate("node").unwrap();
        let other = SoftwareKeyPair::generate("other").unwrap();
        let sig = key.sign_now(b"message");

        assert!(key.verify(b"message", &sig).unwrap());
        assert!(!key.verify(b"massage", &sig).unwrap());
        assert!(!other.verify(b"message", &sig).unwrap());
        assert_eq!(key.key_id().len(), KEY_ID_LEN);
    }

    #[test]
    fn undecodable_signature_is_an_error() {
        let key = SoftwareKeyPair::generate("node").unwrap();
        assert!(matches!(
            key.verify(b"m", "not base64!"),
            Err(KeyError::MalformedSignature(_))
        ));
        assert!(matches!(
            key.verify(b"m", &to_base64(&[1u8; 10])),
            Err(KeyError::MalformedSignature(_))
        ));
    }
}
