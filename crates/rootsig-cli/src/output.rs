//! Input decoding and output formatting utilities.

use rootsig_codec::encoding::{from_base64, to_base64};
use serde_json::Value;

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Decodes command-line bytes given as base64 or hex.
pub fn decode_bytes(field: &'static str, input: &str, hex: bool) -> Result<Vec<u8>, String> {
    if hex {
        hex::decode(input.trim()).map_err(|e| format!("invalid hex in {}: {}", field, e))
    } else {
        from_base64(field, input.trim()).map_err(|e| e.to_string())
    }
}

/// Encodes bytes the same way they were read.
pub fn encode_bytes(bytes: &[u8], hex: bool) -> String {
    if hex {
        hex::encode(bytes)
    } else {
        to_base64(bytes)
    }
}

/// Prints a verification verdict.
pub fn print_verdict(valid: bool, json: bool) {
    if json {
        println!("{}", format_json(&serde_json::json!({ "valid": valid })));
    } else if valid {
        println!("valid");
    } else {
        println!("invalid");
    }
}

/// Client data JSON as a value when it parses, or as lossy text otherwise.
pub fn client_data_value(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
