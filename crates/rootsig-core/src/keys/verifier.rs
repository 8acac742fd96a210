use p256::ecdsa::signature::Verifier as _;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use rootsig_codec::{from_base64, ClientData, CodecError, CompactSignature};
use sha2::{Digest, Sha256};

use super::{KeyKind, Verifier};
use crate::errors::KeyError;

/// Imports an SPKI-encoded P-256 public key.
pub fn import_spki(spki: &[u8]) -> Result<VerifyingKey, KeyError> {
    VerifyingKey::from_public_key_der(spki).map_err(|e| KeyError::MalformedPublicKey(e.to_string()))
}

fn parse_raw_signature(raw: &[u8]) -> Result<Signature, KeyError> {
    Signature::from_slice(raw)
        .map_err(|e| CodecError::MalformedSignature(format!("raw r||s: {e}")).into())
}

/// Verifies compact signatures produced by a platform authenticator.
#[derive(Debug, Clone)]
pub struct AuthenticatorVerifier {
    key: VerifyingKey,
}

impl AuthenticatorVerifier {
    /// Builds a verifier from SPKI bytes.
    pub fn from_spki(spki: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            key: import_spki(spki)?,
        })
    }

    /// Reports whether the client data's challenge equals `expected`.
    pub fn challenge_matches(client_data_json: &[u8], expected: &[u8]) -> Result<bool, KeyError> {
        let client_data = ClientData::parse(client_data_json)?;
        Ok(client_data.challenge_bytes()? == expected)
    }

    /// Checks the ECDSA signature over `authenticator_data || SHA-256(client_data_json)`.
    pub fn verify_assertion(
        &self,
        authenticator_data: &[u8],
        client_data_json: &[u8],
        raw_signature: &[u8],
    ) -> Result<bool, KeyError> {
        let signature = parse_raw_signature(raw_signature)?;
        let mut signed = Vec::with_capacity(authenticator_data.len() + 32);
        signed.extend_from_slice(authenticator_data);
        signed.extend_from_slice(&Sha256::digest(client_data_json));
        Ok(self.key.verify(&signed, &signature).is_ok())
    }
}

impl Verifier for AuthenticatorVerifier {
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        let compact = CompactSignature::decode(signature)?;
        if !Self::challenge_matches(&compact.client_data_json, message)? {
            return Ok(false);
        }
        self.verify_assertion(
            &compact.authenticator_data,
            &compact.client_data_json,
            &compact.signature,
        )
    }
}

/// Verifies base64 `r || s` signatures made directly over the message.
#[derive(Debug, Clone)]
pub struct SoftwareVerifier {
    key: VerifyingKey,
}

impl SoftwareVerifier {
    /// Builds a verifier from SPKI bytes.
    pub fn from_spki(spki: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            key: import_spki(spki)?,
        })
    }

    pub(crate) fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }
}

impl Verifier for SoftwareVerifier {
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        let raw = from_base64("signature", signature)?;
        let signature = parse_raw_signature(&raw)?;
        Ok(self.key.verify(message, &signature).is_ok())
    }
}

/// Verifier for a public key of known kind.
#[derive(Debug, Clone)]
pub enum PublicKeyVerifier {
    /// Compact authenticator signatures.
    Authenticator(AuthenticatorVerifier),
    /// Software `r || s` signatures.
    Software(SoftwareVerifier),
}

impl PublicKeyVerifier {
    /// Picks the verifier matching `kind`.
    ///
    /// Delegated keys have no standalone verifier; their signatures are
    /// checked with [`verify_chain`](crate::trust::verify_chain).
    pub fn from_spki(kind: KeyKind, spki: &[u8]) -> Result<Self, KeyError> {
        match kind {
            KeyKind::Authenticator => Ok(Self::Authenticator(AuthenticatorVerifier::from_spki(spki)?)),
            KeyKind::Software => Ok(Self::Software(SoftwareVerifier::from_spki(spki)?)),
            KeyKind::Delegated => Err(KeyError::UnsupportedOperation(
                "delegated signatures are verified as chains",
            )),
        }
    }
}

impl Verifier for PublicKeyVerifier {
    fn verify(&self, message: &[u8], signature: &str) -> Result<bool, KeyError> {
        match self {
            Self::Authenticator(v) => v.verify(message, signature),
            Self::Software(v) => v.verify(message, signature),
        }
    }
}
