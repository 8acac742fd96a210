//! Convert command implementation.

use rootsig_codec::{compact_to_der, der_to_compact};

use crate::output::{decode_bytes, encode_bytes};
use crate::SignatureForm;

pub fn run(input: String, to: SignatureForm, hex: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = decode_bytes("signature", &input, hex)?;
    let converted = match to {
        SignatureForm::Compact => der_to_compact(&bytes)?,
        SignatureForm::Der => compact_to_der(&bytes)?,
    };
    println!("{}", encode_bytes(&converted, hex));
    Ok(())
}
