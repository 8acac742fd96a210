use rootsig_core::{AuthenticatorError, KeyError};
use rootsig_store::StoreError;
use thiserror::Error;

use crate::wire::WireError;

/// How an error may be reported to the remote caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-correctable; the message is shown verbatim.
    Client,
    /// Signature or format verification failed; shown only as "verification failed".
    Protocol,
    /// Server-side failure; logged, never described to the caller.
    Internal,
}

/// Errors raised by the authentication server and client helpers.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The nonce was never issued, already used, or has expired.
    #[error("invalid or expired nonce")]
    NonceInvalidOrExpired,
    /// The submitted public key is not a P-256 SPKI.
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    /// An account already exists for the username.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    /// The username does not match the allowed pattern.
    #[error("invalid username '{0}'")]
    InvalidUsername(String),
    /// No account for the username.
    #[error("account '{0}' not found")]
    AccountNotFound(String),
    /// A request field could not be decoded.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// The client data challenge is not the issued nonce.
    #[error("challenge mismatch")]
    ChallengeMismatch,
    /// The assertion signature does not verify.
    #[error("signature invalid")]
    SignatureInvalid,
    /// The signature or client data could not be decoded.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    /// The authenticator collaborator failed.
    #[error("authenticator error: {0}")]
    Authenticator(#[from] AuthenticatorError),
    /// Storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    /// A key was asked for a capability it lacks.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The transport returned a failure response.
    #[error("server returned {status}: {message}")]
    Remote {
        /// Status code of the response.
        status: u16,
        /// Error text of the response.
        message: String,
    },
}

impl AuthError {
    /// Reporting class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::NonceInvalidOrExpired
            | AuthError::MalformedPublicKey(_)
            | AuthError::UsernameTaken(_)
            | AuthError::InvalidUsername(_)
            | AuthError::AccountNotFound(_)
            | AuthError::MalformedRequest(_)
            | AuthError::Remote { .. } => ErrorClass::Client,
            AuthError::ChallengeMismatch
            | AuthError::SignatureInvalid
            | AuthError::MalformedSignature(_) => ErrorClass::Protocol,
            AuthError::Authenticator(_)
            | AuthError::Storage(_)
            | AuthError::Unsupported(_)
            | AuthError::InvalidConfig(_) => ErrorClass::Internal,
        }
    }
}

impl From<KeyError> for AuthError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::MalformedSignature(e) => AuthError::MalformedSignature(e.to_string()),
            KeyError::MalformedPublicKey(e) => AuthError::MalformedPublicKey(e),
            KeyError::Authenticator(e) => AuthError::Authenticator(e),
            KeyError::Storage(e) => AuthError::Storage(e),
            KeyError::UnsupportedOperation(op) => AuthError::Unsupported(op),
        }
    }
}

impl From<WireError> for AuthError {
    fn from(err: WireError) -> Self {
        AuthError::Remote {
            status: err.status,
            message: err.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootsig_codec::CodecError;

    #[test]
    fn classes_follow_the_taxonomy() {
        assert_eq!(AuthError::NonceInvalidOrExpired.class(), ErrorClass::Client);
        assert_eq!(
            AuthError::UsernameTaken("alice".into()).class(),
            ErrorClass::Client
        );
        assert_eq!(AuthError::SignatureInvalid.class(), ErrorClass::Protocol);
        assert_eq!(AuthError::ChallengeMismatch.class(), ErrorClass::Protocol);
        assert_eq!(
            AuthError::Storage(StoreError::Other("down".into())).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn key_errors_keep_their_meaning() {
        let err: AuthError = KeyError::MalformedSignature(CodecError::WrongPartCount {
            expected: 3,
            found: 1,
        })
        .into();
        assert_eq!(err.class(), ErrorClass::Protocol);
        let err: AuthError = KeyError::MalformedPublicKey("short".into()).into();
        assert!(matches!(err, AuthError::MalformedPublicKey(_)));
    }
}
