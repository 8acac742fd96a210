use base64::alphabet;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::CodecError;

/// Standard alphabet decoder that accepts input with or without padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes as padded standard base64, the form used on every wire field.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encodes bytes as unpadded base64url, the form WebAuthn uses for challenges.
pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64 in either the standard or URL-safe alphabet, padded or not.
///
/// `field` names the value in the returned error.
pub fn from_base64(field: &'static str, input: &str) -> Result<Vec<u8>, CodecError> {
    let normalized: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    LENIENT
        .decode(normalized.as_bytes())
        .map_err(|source| CodecError::Base64 { field, source })
}

/// Decodes padded standard base64 only, rejecting every other spelling.
///
/// Used for signature string fields, where each value has exactly one
/// encoding so that decode followed by encode returns the input unchanged.
pub fn from_base64_canonical(field: &'static str, input: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(input.as_bytes())
        .map_err(|source| CodecError::Base64 { field, source })
}

/// `#[serde(with = "base64_field")]` for byte fields carried as base64 strings.
pub mod base64_field {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    /// Serializes bytes as padded standard base64.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_base64(bytes))
    }

    /// Deserializes base64 in either alphabet.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::from_base64("field", &s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "base64_field")]
        bytes: Vec<u8>,
    }

    #[test]
    fn serde_field_uses_base64() {
        let w = Wrapper { bytes: vec![1, 2, 3] };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"bytes":"AQID"}"#);
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
        assert!(serde_json::from_str::<Wrapper>(r#"{"bytes":"*"}"#).is_err());
    }

    #[test]
    fn decodes_both_alphabets() {
        let bytes = [0xfb, 0xff, 0xbf, 0x01];
        let standard = to_base64(&bytes);
        let url = to_base64url(&bytes);
        assert_ne!(standard, url);
        assert_eq!(from_base64("test", &standard).unwrap(), bytes);
        assert_eq!(from_base64("test", &url).unwrap(), bytes);
    }

    #[test]
    fn canonical_decoder_rejects_other_spellings() {
        assert_eq!(from_base64_canonical("f", "AP8=").unwrap(), vec![0x00, 0xff]);
        assert!(from_base64_canonical("f", "AP8").is_err());
        assert!(from_base64_canonical("f", "AP-_").is_err());
        // Non-zero trailing bits.
        assert!(from_base64_canonical("f", "AP9=").is_err());
        assert!(from_base64_canonical("f", "").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let err = from_base64("nonce", "not base64!").unwrap_err();
        assert!(err.to_string().contains("nonce"));
    }
}
