//! Transport-neutral request/response layer.
//!
//! Four operations, named as the HTTP routes that front them:
//! `createAccountInitial`, `createAccount`, `loginInitial` and `login`. Bodies
//! are JSON with byte fields in base64. Failures carry a status and a
//! message that never reveals more than the error's class allows.

use async_trait::async_trait;
use rootsig_codec::encoding::base64_field;
use rootsig_store::{AccountStore, NonceStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::errors::{AuthError, ErrorClass};
use crate::server::AuthServer;

/// Operation names.
pub mod ops {
    /// Issue a registration nonce.
    pub const CREATE_ACCOUNT_INITIAL: &str = "createAccountInitial";
    /// Register an account.
    pub const CREATE_ACCOUNT: &str = "createAccount";
    /// Issue a login nonce.
    pub const LOGIN_INITIAL: &str = "loginInitial";
    /// Complete a login.
    pub const LOGIN: &str = "login";
}

const VERIFICATION_FAILED: &str = "verification failed";
const INTERNAL_ERROR: &str = "internal server error";

/// Response carrying a fresh nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceResponse {
    /// The nonce.
    #[serde(with = "base64_field")]
    pub nonce: Vec<u8>,
}

/// `createAccount` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Registration nonce.
    #[serde(with = "base64_field")]
    pub nonce: Vec<u8>,
    /// Requested username.
    pub username: String,
    /// Authenticator credential id.
    #[serde(with = "base64_field")]
    pub key_id: Vec<u8>,
    /// SPKI public key.
    #[serde(with = "base64_field")]
    pub public_key: Vec<u8>,
}

/// `loginInitial` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginLoginRequest {
    /// Account to log in to.
    pub username: String,
}

/// `loginInitial` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginLoginResponse {
    /// Login nonce.
    #[serde(with = "base64_field")]
    pub nonce: Vec<u8>,
    /// Credential id to assert with.
    #[serde(with = "base64_field")]
    pub key_id: Vec<u8>,
}

/// `login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLoginRequest {
    /// Login nonce.
    #[serde(with = "base64_field")]
    pub nonce: Vec<u8>,
    /// Account name.
    pub username: String,
    /// Raw authenticator data.
    #[serde(with = "base64_field")]
    pub authenticator_data: Vec<u8>,
    /// Raw client data JSON.
    #[serde(rename = "clientDataJSON", with = "base64_field")]
    pub client_data_json: Vec<u8>,
    /// Compact `r || s` signature.
    #[serde(with = "base64_field")]
    pub signature: Vec<u8>,
}

/// Body of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Self {
        Self { success: true }
    }
}

/// Failure response: HTTP-like status and a caller-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{status}: {error}")]
pub struct WireError {
    /// 400 for caller errors, 500 otherwise.
    #[serde(skip)]
    pub status: u16,
    /// Message safe to show the caller.
    pub error: String,
}

impl From<AuthError> for WireError {
    fn from(err: AuthError) -> Self {
        match err.class() {
            ErrorClass::Client => WireError {
                status: 400,
                error: err.to_string(),
            },
            ErrorClass::Protocol => WireError {
                status: 400,
                error: VERIFICATION_FAILED.to_string(),
            },
            ErrorClass::Internal => {
                error!(event = "internal_error", error = %err);
                WireError {
                    status: 500,
                    error: INTERNAL_ERROR.to_string(),
                }
            }
        }
    }
}

/// The four operations, as seen by a client.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Issues a registration nonce.
    async fn create_account_initial(&self) -> Result<NonceResponse, WireError>;
    /// Registers an account.
    async fn create_account(&self, request: RegisterRequest) -> Result<SuccessResponse, WireError>;
    /// Issues a login nonce.
    async fn login_initial(
        &self,
        request: BeginLoginRequest,
    ) -> Result<BeginLoginResponse, WireError>;
    /// Completes a login.
    async fn login(&self, request: CompleteLoginRequest) -> Result<SuccessResponse, WireError>;
}

/// Serves the four operations from an [`AuthServer`].
#[derive(Debug)]
pub struct WireService<S> {
    server: AuthServer<S>,
}

impl<S> Clone for WireService<S> {
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
        }
    }
}

impl<S: NonceStore + AccountStore> WireService<S> {
    /// Wraps `server`.
    pub fn new(server: AuthServer<S>) -> Self {
        Self { server }
    }

    /// The wrapped server.
    pub fn server(&self) -> &AuthServer<S> {
        &self.server
    }

    /// Handles a JSON request for `operation`, returning status and JSON body.
    pub async fn handle(&self, operation: &str, body: &str) -> (u16, String) {
        match operation {
            ops::CREATE_ACCOUNT_INITIAL => respond(self.create_account_initial().await),
            ops::CREATE_ACCOUNT => match parse_body(body) {
                Ok(request) => respond(self.create_account(request).await),
                Err(e) => respond::<SuccessResponse>(Err(e)),
            },
            ops::LOGIN_INITIAL => match parse_body(body) {
                Ok(request) => respond(self.login_initial(request).await),
                Err(e) => respond::<BeginLoginResponse>(Err(e)),
            },
            ops::LOGIN => match parse_body(body) {
                Ok(request) => respond(self.login(request).await),
                Err(e) => respond::<SuccessResponse>(Err(e)),
            },
            other => respond::<SuccessResponse>(Err(WireError {
                status: 404,
                error: format!("unknown operation '{other}'"),
            })),
        }
    }
}

#[async_trait]
impl<S: NonceStore + AccountStore> AuthTransport for WireService<S> {
    async fn create_account_initial(&self) -> Result<NonceResponse, WireError> {
        let nonce = self.server.create_challenge().await?;
        Ok(NonceResponse { nonce })
    }

    async fn create_account(&self, request: RegisterRequest) -> Result<SuccessResponse, WireError> {
        self.server
            .register(
                &request.nonce,
                &request.username,
                &request.key_id,
                &request.public_key,
            )
            .await?;
        Ok(SuccessResponse::ok())
    }

    async fn login_initial(
        &self,
        request: BeginLoginRequest,
    ) -> Result<BeginLoginResponse, WireError> {
        let challenge = self.server.begin_login(&request.username).await?;
        Ok(BeginLoginResponse {
            nonce: challenge.nonce,
            key_id: challenge.key_id,
        })
    }

    async fn login(&self, request: CompleteLoginRequest) -> Result<SuccessResponse, WireError> {
        self.server
            .complete_login(
                &request.nonce,
                &request.username,
                &request.authenticator_data,
                &request.client_data_json,
                &request.signature,
            )
            .await?;
        Ok(SuccessResponse::ok())
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, WireError> {
    serde_json::from_str(body).map_err(|e| AuthError::MalformedRequest(e.to_string()).into())
}

fn respond<T: Serialize>(result: Result<T, WireError>) -> (u16, String) {
    let (status, body) = match result {
        Ok(value) => (200, serde_json::to_string(&value)),
        Err(err) => (err.status, serde_json::to_string(&err)),
    };
    match body {
        Ok(body) => (status, body),
        Err(e) => {
            error!(event = "response_encoding_failed", error = %e);
            (500, format!(r#"{{"error":"{INTERNAL_ERROR}"}}"#))
        }
    }
}
