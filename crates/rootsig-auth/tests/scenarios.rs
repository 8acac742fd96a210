use std::sync::Arc;

use chrono::{Duration, Utc};
use rootsig_auth::{
    create_registration_key, perform_login_challenge, AuthConfig, AuthError, AuthServer,
    ErrorClass,
};
use rootsig_core::VirtualAuthenticator;
use rootsig_store::{AccountStore, MemoryAuthStore, NonceStore};

fn make_server() -> AuthServer<MemoryAuthStore> {
    AuthServer::new(Arc::new(MemoryAuthStore::new()), AuthConfig::default()).unwrap()
}

fn make_authenticator() -> Arc<VirtualAuthenticator> {
    Arc::new(VirtualAuthenticator::new("rootsig.test"))
}

async fn register_alice(
    server: &AuthServer<MemoryAuthStore>,
    authenticator: &Arc<VirtualAuthenticator>,
) -> Vec<u8> {
    let nonce = server.create_challenge().await.unwrap();
    let key = create_registration_key(authenticator.clone(), "alice", &nonce)
        .await
        .unwrap();
    server
        .register(&nonce, "alice", key.key_id(), key.public_key())
        .await
        .unwrap();
    key.key_id().to_vec()
}

#[tokio::test]
async fn test_scenario_a_registration() {
    let server = make_server();
    let authenticator = make_authenticator();

    let nonce = server.create_challenge().await.unwrap();
    assert_eq!(nonce.len(), 64);
    let key = create_registration_key(authenticator.clone(), "alice", &nonce)
        .await
        .unwrap();
    server
        .register(&nonce, "alice", key.key_id(), key.public_key())
        .await
        .unwrap();

    let account = server.store().get_account("alice").await.unwrap().unwrap();
    assert_eq!(account.key_id, key.key_id());

    let again = server.create_challenge().await.unwrap();
    let err = server
        .register(&again, "alice", &[9, 9], key.public_key())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken(ref name) if name == "alice"));
    assert_eq!(err.class(), ErrorClass::Client);
}

#[tokio::test]
async fn test_registration_nonce_is_single_use() {
    let server = make_server();
    let authenticator = make_authenticator();
    let nonce = server.create_challenge().await.unwrap();
    let key = create_registration_key(authenticator.clone(), "alice", &nonce)
        .await
        .unwrap();
    server
        .register(&nonce, "alice", key.key_id(), key.public_key())
        .await
        .unwrap();

    assert!(matches!(
        server
            .register(&nonce, "bob", key.key_id(), key.public_key())
            .await,
        Err(AuthError::NonceInvalidOrExpired)
    ));
}

#[tokio::test]
async fn test_registration_rejects_bad_input_and_burns_nonce() {
    let server = make_server();
    let nonce = server.create_challenge().await.unwrap();
    assert!(matches!(
        server.register(&nonce, "alice", &[1], b"not a key").await,
        Err(AuthError::MalformedPublicKey(_))
    ));
    // The failed attempt consumed the nonce.
    assert!(matches!(
        server.register(&nonce, "alice", &[1], b"not a key").await,
        Err(AuthError::NonceInvalidOrExpired)
    ));

    let nonce = server.create_challenge().await.unwrap();
    assert!(matches!(
        server.register(&nonce, "has space", &[1], b"").await,
        Err(AuthError::InvalidUsername(_))
    ));
}

#[tokio::test]
async fn test_expired_nonce_is_rejected() {
    let server = make_server();
    let nonce = vec![7u8; 64];
    server
        .store()
        .store_nonce(&nonce, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();
    assert!(matches!(
        server.register(&nonce, "alice", &[1], &[2]).await,
        Err(AuthError::NonceInvalidOrExpired)
    ));
}

#[tokio::test]
async fn test_scenario_b_login_and_replay() {
    let server = make_server();
    let authenticator = make_authenticator();
    let key_id = register_alice(&server, &authenticator).await;

    let challenge = server.begin_login("alice").await.unwrap();
    assert_eq!(challenge.key_id, key_id);
    assert_eq!(challenge.nonce.len(), 64);

    let response = perform_login_challenge(authenticator.as_ref(), &challenge.key_id, &challenge.nonce)
        .await
        .unwrap();
    assert_eq!(response.signature.len(), 64);
    server
        .complete_login(
            &challenge.nonce,
            "alice",
            &response.authenticator_data,
            &response.client_data_json,
            &response.signature,
        )
        .await
        .unwrap();

    let replay = server
        .complete_login(
            &challenge.nonce,
            "alice",
            &response.authenticator_data,
            &response.client_data_json,
            &response.signature,
        )
        .await;
    assert!(matches!(replay, Err(AuthError::NonceInvalidOrExpired)));
}

#[tokio::test]
async fn test_scenario_c_tampered_authenticator_data() {
    let server = make_server();
    let authenticator = make_authenticator();
    let key_id = register_alice(&server, &authenticator).await;

    let challenge = server.begin_login("alice").await.unwrap();
    let mut response = perform_login_challenge(authenticator.as_ref(), &key_id, &challenge.nonce)
        .await
        .unwrap();
    response.authenticator_data[33] ^= 0x40;

    let err = server
        .complete_login(
            &challenge.nonce,
            "alice",
            &response.authenticator_data,
            &response.client_data_json,
            &response.signature,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SignatureInvalid));
    assert_eq!(err.class(), ErrorClass::Protocol);
}

#[tokio::test]
async fn test_signature_over_other_nonce_is_challenge_mismatch() {
    let server = make_server();
    let authenticator = make_authenticator();
    let key_id = register_alice(&server, &authenticator).await;

    let first = server.begin_login("alice").await.unwrap();
    let second = server.begin_login("alice").await.unwrap();
    let response = perform_login_challenge(authenticator.as_ref(), &key_id, &second.nonce)
        .await
        .unwrap();

    assert!(matches!(
        server
            .complete_login(
                &first.nonce,
                "alice",
                &response.authenticator_data,
                &response.client_data_json,
                &response.signature,
            )
            .await,
        Err(AuthError::ChallengeMismatch)
    ));
}

#[tokio::test]
async fn test_malformed_signature_is_protocol_error() {
    let server = make_server();
    let authenticator = make_authenticator();
    let key_id = register_alice(&server, &authenticator).await;

    let challenge = server.begin_login("alice").await.unwrap();
    let response = perform_login_challenge(authenticator.as_ref(), &key_id, &challenge.nonce)
        .await
        .unwrap();
    let err = server
        .complete_login(
            &challenge.nonce,
            "alice",
            &response.authenticator_data,
            &response.client_data_json,
            &response.signature[..40],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MalformedSignature(_)));
    assert_eq!(err.class(), ErrorClass::Protocol);
}

#[tokio::test]
async fn test_unknown_account() {
    let server = make_server();
    assert!(matches!(
        server.begin_login("nobody").await,
        Err(AuthError::AccountNotFound(_))
    ));
    let nonce = server.create_challenge().await.unwrap();
    assert!(matches!(
        server.complete_login(&nonce, "nobody", &[], &[], &[]).await,
        Err(AuthError::AccountNotFound(_))
    ));
    // Account lookup comes first; the nonce is still usable.
    assert!(server.store().verify_and_delete(&nonce).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_login_with_one_nonce_has_one_winner() {
    let server = make_server();
    let authenticator = make_authenticator();
    let key_id = register_alice(&server, &authenticator).await;
    let challenge = server.begin_login("alice").await.unwrap();
    let response = perform_login_challenge(authenticator.as_ref(), &key_id, &challenge.nonce)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let server = server.clone();
        let nonce = challenge.nonce.clone();
        let response = response.clone();
        handles.push(tokio::spawn(async move {
            server
                .complete_login(
                    &nonce,
                    "alice",
                    &response.authenticator_data,
                    &response.client_data_json,
                    &response.signature,
                )
                .await
                .is_ok()
        }));
    }
    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}
