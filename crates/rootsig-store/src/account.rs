use rootsig_codec::encoding::base64_field;
use serde::{Deserialize, Serialize};

/// A registered user: one username bound to one authenticator credential.
///
/// Accounts are created once at registration and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique username.
    pub username: String,
    /// Authenticator credential id.
    #[serde(with = "base64_field")]
    pub key_id: Vec<u8>,
    /// SPKI-encoded P-256 public key.
    #[serde(with = "base64_field")]
    pub public_key: Vec<u8>,
}
