//! Chained signatures from root-endorsed ephemeral keys.

use rootsig_codec::ChainedSignature;
use tracing::debug;

use crate::errors::KeyError;
use crate::keys::{
    AuthenticatorVerifier, DelegatedKeyPair, KeyPair, Signer, SoftwareKeyPair, SoftwareVerifier,
    Verifier,
};

/// Has `root` endorse `temp`'s public key and wraps the two as a delegated signer.
pub async fn delegate(
    root: &KeyPair,
    temp: SoftwareKeyPair,
) -> Result<DelegatedKeyPair, KeyError> {
    let endorsement = root.sign(temp.public_key()).await?;
    Ok(DelegatedKeyPair::new(temp, endorsement))
}

/// Verifies a chain against an authenticator-backed root public key.
pub fn verify_chain(
    message: &[u8],
    chain: &str,
    root_public_key: &[u8],
) -> Result<bool, KeyError> {
    let root = AuthenticatorVerifier::from_spki(root_public_key)?;
    verify_chain_with(message, chain, &root)
}

/// Verifies a chain with an arbitrary root verifier.
///
/// The endorsement of the temp key is checked first; the message signature is
/// only checked if that passes.
pub fn verify_chain_with(
    message: &[u8],
    chain: &str,
    root: &dyn Verifier,
) -> Result<bool, KeyError> {
    let chained = ChainedSignature::decode(chain)?;
    if !root.verify(&chained.temp_public_key, &chained.endorsement)? {
        debug!(event = "chain_endorsement_mismatch");
        return Ok(false);
    }
    SoftwareVerifier::from_spki(&chained.temp_public_key)?
        .verify(message, &chained.message_signature)
}
