//! Keygen command implementation.
//!
//! Keys live only for the duration of the command. Authenticator keys come
//! from an in-process virtual authenticator, so the output is useful as test
//! material rather than as a credential.

use std::sync::Arc;

use rootsig_codec::to_base64;
use rootsig_core::{
    delegate, Authenticator, AuthenticatorKeyPair, KeyPair, Signer, SoftwareKeyPair,
    VirtualAuthenticator,
};
use serde_json::json;
use tracing::info;

use crate::output::format_json;
use crate::KindArg;

const RP_ID: &str = "rootsig.cli";
const CREATION_CHALLENGE: &[u8] = b"rootsig-keygen";
const TEMP_USER_ID: &str = "cli-temp";

pub async fn run(
    user_id: String,
    kind: KindArg,
    sign: Option<String>,
    chain: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let key: KeyPair = match kind {
        KindArg::Software => SoftwareKeyPair::generate(user_id.clone())?.into(),
        KindArg::Authenticator => {
            let authenticator: Arc<dyn Authenticator> = Arc::new(VirtualAuthenticator::new(RP_ID));
            AuthenticatorKeyPair::create(authenticator, None, &user_id, CREATION_CHALLENGE)
                .await?
                .into()
        }
    };
    info!(event = "cli_keygen", user_id = %user_id, kind = ?key.kind());

    let mut output = json!({
        "userId": key.user_id(),
        "kind": key.kind(),
        "keyId": to_base64(key.key_id()),
        "publicKey": to_base64(key.public_key()),
    });

    if let Some(message) = sign {
        output["message"] = json!(message);
        output["signature"] = json!(key.sign(message.as_bytes()).await?);
    }
    if let Some(message) = chain {
        let delegated = delegate(&key, SoftwareKeyPair::generate(TEMP_USER_ID)?).await?;
        output["message"] = json!(message);
        output["chainedSignature"] = json!(delegated.sign(message.as_bytes()).await?);
    }

    println!("{}", format_json(&output));
    Ok(())
}
