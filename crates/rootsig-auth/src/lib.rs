//! Nonce-based challenge/response registration and login.
//!
//! This crate provides:
//! - [`AuthServer`]: issues single-use nonces, registers accounts, verifies logins
//! - [`WireService`]: the four wire operations with caller-safe error reporting
//! - [`AuthClient`] and helpers that answer challenges with an authenticator
//! - [`AuthConfig`]: nonce lifetime and length
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rootsig_auth::{AuthClient, AuthConfig, AuthServer, WireService};
//! use rootsig_core::VirtualAuthenticator;
//! use rootsig_store::MemoryAuthStore;
//!
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let server = AuthServer::new(Arc::new(MemoryAuthStore::new()), AuthConfig::default())?;
//! let client = AuthClient::new(WireService::new(server));
//! let authenticator = Arc::new(VirtualAuthenticator::new("example.org"));
//!
//! client.register(authenticator.clone(), "alice").await?;
//! client.login(authenticator.as_ref(), "alice").await?;
//! # Ok::<(), rootsig_auth::AuthError>(())
//! # })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Errors are classified by [`ErrorClass`]: client errors are reported
//! verbatim, verification failures only as "verification failed", and
//! internal failures are logged and reported opaquely.

#![deny(missing_docs)]

/// Client helpers and flows.
pub mod client;
/// Server configuration.
pub mod config;
/// Error types and their reporting class.
pub mod errors;
/// Challenge/response server.
pub mod server;
/// Transport-neutral request/response layer.
pub mod wire;

pub use client::{
    create_registration_key, perform_login_challenge, AuthClient, LoginChallengeResult,
};
pub use config::AuthConfig;
pub use errors::{AuthError, ErrorClass};
pub use server::{AuthServer, LoginChallenge};
pub use wire::{
    AuthTransport, BeginLoginRequest, BeginLoginResponse, CompleteLoginRequest, NonceResponse,
    RegisterRequest, SuccessResponse, WireError, WireService,
};
