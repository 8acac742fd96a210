//! Challenge/response server.
//!
//! Registration and login are independent flows. Both start with a random
//! nonce that the store consumes exactly once; a consumed nonce is gone even
//! if the request later fails verification, so every retry needs a fresh one.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use rootsig_core::keys::import_spki;
use rootsig_core::AuthenticatorVerifier;
use rootsig_store::{Account, AccountStore, NonceStore, StoreError};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::errors::AuthError;

/// Nonce and credential id handed to a client starting login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginChallenge {
    /// Fresh nonce to sign.
    pub nonce: Vec<u8>,
    /// Credential id registered for the account.
    pub key_id: Vec<u8>,
}

/// Authentication server over a nonce and account store.
#[derive(Debug)]
pub struct AuthServer<S> {
    store: Arc<S>,
    config: AuthConfig,
}

impl<S> Clone for AuthServer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: NonceStore + AccountStore> AuthServer<S> {
    /// Creates a server with the given store and configuration.
    ///
    /// Fails with [`AuthError::InvalidConfig`] if `config` does not validate.
    pub fn new(store: Arc<S>, config: AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    async fn issue_nonce(&self) -> Result<Vec<u8>, AuthError> {
        let mut nonce = vec![0u8; self.config.nonce_len];
        OsRng.fill_bytes(&mut nonce);
        let expires_at = Utc::now() + self.config.nonce_ttl();
        self.store.store_nonce(&nonce, expires_at).await?;
        debug!(event = "nonce_issued", expires_at = %expires_at);
        Ok(nonce)
    }

    async fn consume_nonce(&self, nonce: &[u8]) -> Result<(), AuthError> {
        if !self.store.verify_and_delete(nonce).await? {
            return Err(AuthError::NonceInvalidOrExpired);
        }
        Ok(())
    }

    /// Issues a registration nonce.
    pub async fn create_challenge(&self) -> Result<Vec<u8>, AuthError> {
        self.issue_nonce().await
    }

    /// Registers `username` with an authenticator credential.
    ///
    /// The nonce is consumed before anything else is checked.
    pub async fn register(
        &self,
        nonce: &[u8],
        username: &str,
        key_id: &[u8],
        public_key: &[u8],
    ) -> Result<(), AuthError> {
        self.consume_nonce(nonce).await?;
        validate_username(username)?;
        import_spki(public_key)?;

        let account = Account {
            username: username.to_string(),
            key_id: key_id.to_vec(),
            public_key: public_key.to_vec(),
        };
        match self.store.create_account(account).await {
            Ok(()) => {
                info!(event = "account_registered", username);
                Ok(())
            }
            Err(StoreError::AccountExists(name)) => {
                warn!(event = "registration_rejected", username, reason = "taken");
                Err(AuthError::UsernameTaken(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Issues a login nonce for an existing account.
    pub async fn begin_login(&self, username: &str) -> Result<LoginChallenge, AuthError> {
        let account = self.account(username).await?;
        let nonce = self.issue_nonce().await?;
        Ok(LoginChallenge {
            nonce,
            key_id: account.key_id,
        })
    }

    /// Checks an assertion over a login nonce. `Ok(())` means authenticated.
    pub async fn complete_login(
        &self,
        nonce: &[u8],
        username: &str,
        authenticator_data: &[u8],
        client_data_json: &[u8],
        signature: &[u8],
    ) -> Result<(), AuthError> {
        let account = self.account(username).await?;
        self.consume_nonce(nonce).await?;

        let result = verify_login(
            &account,
            nonce,
            authenticator_data,
            client_data_json,
            signature,
        );
        match &result {
            Ok(()) => info!(event = "login_succeeded", username),
            Err(e) => warn!(event = "login_failed", username, reason = %e),
        }
        result
    }

    async fn account(&self, username: &str) -> Result<Account, AuthError> {
        self.store
            .get_account(username)
            .await?
            .ok_or_else(|| AuthError::AccountNotFound(username.to_string()))
    }
}

fn verify_login(
    account: &Account,
    nonce: &[u8],
    authenticator_data: &[u8],
    client_data_json: &[u8],
    signature: &[u8],
) -> Result<(), AuthError> {
    if !AuthenticatorVerifier::challenge_matches(client_data_json, nonce)? {
        return Err(AuthError::ChallengeMismatch);
    }
    let verifier = AuthenticatorVerifier::from_spki(&account.public_key)?;
    if !verifier.verify_assertion(authenticator_data, client_data_json, signature)? {
        return Err(AuthError::SignatureInvalid);
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    let pattern = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.@-]{0,63}$").expect("invalid regex");
    if !pattern.is_match(username) {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let store = Arc::new(rootsig_store::MemoryAuthStore::new());
        let short = AuthConfig {
            nonce_len: 0,
            ..AuthConfig::default()
        };
        assert!(matches!(
            AuthServer::new(Arc::clone(&store), short),
            Err(AuthError::InvalidConfig(_))
        ));
        let zero_ttl = AuthConfig {
            nonce_ttl_secs: 0,
            ..AuthConfig::default()
        };
        assert!(matches!(
            AuthServer::new(Arc::clone(&store), zero_ttl),
            Err(AuthError::InvalidConfig(_))
        ));
        assert!(AuthServer::new(store, AuthConfig::default()).is_ok());
    }

    #[test]
    fn username_pattern() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith@example.org").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("-leading").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }
}
