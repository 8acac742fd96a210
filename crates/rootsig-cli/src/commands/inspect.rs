//! Inspect command implementation.

use rootsig_codec::{ChainedSignature, ClientData, CompactSignature};
use serde_json::{json, Value};

use crate::output::{client_data_value, format_json};

pub fn run(signature: String, chained: bool) -> Result<(), Box<dyn std::error::Error>> {
    let output = if chained {
        let chain = ChainedSignature::decode(signature.trim())?;
        json!({
            "temp_public_key": rootsig_codec::to_base64(&chain.temp_public_key),
            "endorsement": describe_compact(&chain.endorsement),
            "message_signature": chain.message_signature,
        })
    } else {
        describe_compact(signature.trim())
    };
    println!("{}", format_json(&output));
    Ok(())
}

/// Structured view of a compact signature, or the raw string when it is not one.
fn describe_compact(input: &str) -> Value {
    match CompactSignature::decode(input) {
        Ok(compact) => {
            let challenge = ClientData::parse(&compact.client_data_json)
                .ok()
                .and_then(|data| data.challenge_bytes().ok())
                .map(hex::encode);
            json!({
                "authenticator_data": hex::encode(&compact.authenticator_data),
                "client_data": client_data_value(&compact.client_data_json),
                "challenge_hex": challenge,
                "signature": hex::encode(&compact.signature),
                "signature_len": compact.signature.len(),
            })
        }
        Err(e) => json!({ "raw": input, "decode_error": e.to_string() }),
    }
}
