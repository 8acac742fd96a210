use serde::{Deserialize, Serialize};

use crate::encoding::{from_base64, to_base64url};
use crate::error::CodecError;

/// `type` value for registration ceremonies.
pub const CEREMONY_CREATE: &str = "webauthn.create";
/// `type` value for assertion ceremonies.
pub const CEREMONY_GET: &str = "webauthn.get";

/// The subset of WebAuthn `clientDataJSON` this system reads.
///
/// Unknown members are ignored. Only `challenge` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    /// Ceremony type (`webauthn.get` or `webauthn.create`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ceremony: Option<String>,
    /// Base64url challenge the authenticator signed over.
    pub challenge: String,
    /// Origin reported by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ClientData {
    /// Builds client data for `challenge` with the given ceremony type.
    pub fn new(ceremony: &str, challenge: &[u8], origin: impl Into<String>) -> Self {
        Self {
            ceremony: Some(ceremony.to_string()),
            challenge: to_base64url(challenge),
            origin: Some(origin.into()),
        }
    }

    /// Parses raw `clientDataJSON` bytes.
    pub fn parse(json: &[u8]) -> Result<Self, CodecError> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Decodes the challenge field into bytes.
    pub fn challenge_bytes(&self) -> Result<Vec<u8>, CodecError> {
        from_base64("clientData.challenge", &self.challenge)
    }

    /// Serializes back into `clientDataJSON` bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(self)?)
    }
}
