use crate::encoding::{from_base64_canonical, to_base64};
use crate::error::CodecError;

const SEPARATOR: char = '.';

fn split_exact(input: &str, expected: usize) -> Result<Vec<&str>, CodecError> {
    let parts: Vec<&str> = input.split(SEPARATOR).collect();
    if parts.len() != expected {
        return Err(CodecError::WrongPartCount {
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

/// Authenticator output in its wire form: three dot-joined base64 fields.
///
/// `authenticatorData.clientDataJSON.signature`, where `signature` is the
/// fixed-width `r || s` produced by [`der_to_compact`](crate::der_to_compact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSignature {
    /// Raw authenticator data.
    pub authenticator_data: Vec<u8>,
    /// Raw client data JSON bytes.
    pub client_data_json: Vec<u8>,
    /// Fixed-width `r || s`.
    pub signature: Vec<u8>,
}

impl CompactSignature {
    /// Joins the three fields as `a.b.c` in padded standard base64.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            to_base64(&self.authenticator_data),
            to_base64(&self.client_data_json),
            to_base64(&self.signature)
        )
    }

    /// Splits and decodes a compact signature string.
    ///
    /// Fields must be padded standard base64; any other spelling is rejected.
    pub fn decode(input: &str) -> Result<Self, CodecError> {
        let parts = split_exact(input, 3)?;
        Ok(Self {
            authenticator_data: from_base64_canonical("authenticatorData", parts[0])?,
            client_data_json: from_base64_canonical("clientDataJSON", parts[1])?,
            signature: from_base64_canonical("signature", parts[2])?,
        })
    }
}

/// Signature made by a short-lived key that a root key vouched for.
///
/// Wire form: `tempPublicKey.endorsement.messageSignature` where
/// `tempPublicKey` is base64 SPKI, `endorsement` is the base64 of the root
/// key's compact signature string over that SPKI, and `messageSignature` is the
/// temp key's own signature string, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedSignature {
    /// SPKI bytes of the temp key.
    pub temp_public_key: Vec<u8>,
    /// Root key's signature string over `temp_public_key`.
    pub endorsement: String,
    /// Temp key's signature string over the message.
    pub message_signature: String,
}

impl ChainedSignature {
    /// The `tempPublicKey.endorsement` head shared by every signature from one temp key.
    pub fn prefix(temp_public_key: &[u8], endorsement: &str) -> String {
        format!(
            "{}{SEPARATOR}{}",
            to_base64(temp_public_key),
            to_base64(endorsement.as_bytes())
        )
    }

    /// Joins the three fields.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}",
            Self::prefix(&self.temp_public_key, &self.endorsement),
            self.message_signature
        )
    }

    /// Splits a chained signature into exactly three fields.
    pub fn decode(input: &str) -> Result<Self, CodecError> {
        let parts = split_exact(input, 3)?;
        let temp_public_key = from_base64_canonical("tempPublicKey", parts[0])?;
        let endorsement = String::from_utf8(from_base64_canonical("endorsement", parts[1])?)
            .map_err(|_| CodecError::Utf8 {
                field: "endorsement",
            })?;
        Ok(Self {
            temp_public_key,
            endorsement,
            message_signature: parts[2].to_string(),
        })
    }
}
