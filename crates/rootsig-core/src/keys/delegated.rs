use async_trait::async_trait;
use rootsig_codec::ChainedSignature;

use super::software::SoftwareKeyPair;
use super::Signer;
use crate::errors::KeyError;

/// Short-lived software key whose authority comes from a root key's endorsement.
///
/// Signs only. Its signatures are chains that a verifier checks against the
/// root public key with [`verify_chain`](crate::trust::verify_chain).
#[derive(Debug, Clone)]
pub struct DelegatedKeyPair {
    inner: SoftwareKeyPair,
    endorsement: String,
    prefix: String,
}

impl DelegatedKeyPair {
    /// Wraps `inner` with `endorsement`, a root key's signature over its SPKI.
    pub fn new(inner: SoftwareKeyPair, endorsement: String) -> Self {
        let prefix = ChainedSignature::prefix(inner.public_key(), &endorsement);
        Self {
            inner,
            endorsement,
            prefix,
        }
    }

    /// The root key's signature over this key's SPKI.
    pub fn endorsement(&self) -> &str {
        &self.endorsement
    }

    /// The underlying software key.
    pub fn inner(&self) -> &SoftwareKeyPair {
        &self.inner
    }
}

#[async_trait]
impl Signer for DelegatedKeyPair {
    async fn sign(&self, message: &[u8]) -> Result<String, KeyError> {
        Ok(format!("{}.{}", self.prefix, self.inner.sign_now(message)))
    }
}
