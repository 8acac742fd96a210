//! Verify command implementation.

use rootsig_core::{PublicKeyVerifier, Verifier};
use tracing::debug;

use crate::output::{decode_bytes, print_verdict};
use crate::KindArg;

pub fn run(
    signature: String,
    public_key: String,
    kind: KindArg,
    message: String,
    strict: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spki = decode_bytes("public key", &public_key, false)?;
    let verifier = PublicKeyVerifier::from_spki(kind.into(), &spki)?;
    let valid = verifier.verify(message.as_bytes(), signature.trim())?;
    debug!(event = "cli_verify", ?kind, valid);

    print_verdict(valid, json_output);
    if strict && !valid {
        std::process::exit(1);
    }
    Ok(())
}
