//! Client side of registration and login.

use std::sync::Arc;

use rootsig_codec::der_to_compact;
use rootsig_core::{Authenticator, AuthenticatorKeyPair};
use tracing::debug;

use crate::errors::AuthError;
use crate::wire::{
    AuthTransport, BeginLoginRequest, CompleteLoginRequest, RegisterRequest,
};

/// Assertion over a login nonce, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginChallengeResult {
    /// Raw authenticator data.
    pub authenticator_data: Vec<u8>,
    /// Raw client data JSON.
    pub client_data_json: Vec<u8>,
    /// Compact `r || s` signature.
    pub signature: Vec<u8>,
}

/// Creates the account credential, using the server nonce as the creation challenge.
///
/// The key pair has no key store; the server keeps the public half.
pub async fn create_registration_key(
    authenticator: Arc<dyn Authenticator>,
    username: &str,
    nonce: &[u8],
) -> Result<AuthenticatorKeyPair, AuthError> {
    Ok(AuthenticatorKeyPair::create(authenticator, None, username, nonce).await?)
}

/// Asks the authenticator to sign a login nonce with `key_id`.
pub async fn perform_login_challenge(
    authenticator: &dyn Authenticator,
    key_id: &[u8],
    nonce: &[u8],
) -> Result<LoginChallengeResult, AuthError> {
    let assertion = authenticator.get_assertion(nonce, Some(key_id)).await?;
    let signature = der_to_compact(&assertion.signature)
        .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
    Ok(LoginChallengeResult {
        authenticator_data: assertion.authenticator_data,
        client_data_json: assertion.client_data_json,
        signature,
    })
}

/// Drives both flows against a transport.
#[derive(Debug, Clone)]
pub struct AuthClient<T> {
    transport: T,
}

impl<T: AuthTransport> AuthClient<T> {
    /// Creates a client over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Registers `username`, returning the new credential's key pair.
    pub async fn register(
        &self,
        authenticator: Arc<dyn Authenticator>,
        username: &str,
    ) -> Result<AuthenticatorKeyPair, AuthError> {
        let nonce = self.transport.create_account_initial().await?.nonce;
        let key = create_registration_key(authenticator, username, &nonce).await?;
        self.transport
            .create_account(RegisterRequest {
                nonce,
                username: username.to_string(),
                key_id: key.key_id().to_vec(),
                public_key: key.public_key().to_vec(),
            })
            .await?;
        debug!(event = "client_registered", username);
        Ok(key)
    }

    /// Logs in as `username`.
    pub async fn login(
        &self,
        authenticator: &dyn Authenticator,
        username: &str,
    ) -> Result<(), AuthError> {
        let challenge = self
            .transport
            .login_initial(BeginLoginRequest {
                username: username.to_string(),
            })
            .await?;
        let result =
            perform_login_challenge(authenticator, &challenge.key_id, &challenge.nonce).await?;
        self.transport
            .login(CompleteLoginRequest {
                nonce: challenge.nonce,
                username: username.to_string(),
                authenticator_data: result.authenticator_data,
                client_data_json: result.client_data_json,
                signature: result.signature,
            })
            .await?;
        Ok(())
    }
}
