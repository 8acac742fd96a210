//! Verify-chain command implementation.

use rootsig_core::{verify_chain_with, PublicKeyVerifier};
use tracing::debug;

use crate::output::{decode_bytes, print_verdict};
use crate::KindArg;

pub fn run(
    signature: String,
    root_key: String,
    kind: KindArg,
    message: String,
    strict: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spki = decode_bytes("root key", &root_key, false)?;
    let root = PublicKeyVerifier::from_spki(kind.into(), &spki)?;
    let valid = verify_chain_with(message.as_bytes(), signature.trim(), &root)?;
    debug!(event = "cli_verify_chain", ?kind, valid);

    print_verdict(valid, json_output);
    if strict && !valid {
        std::process::exit(1);
    }
    Ok(())
}
