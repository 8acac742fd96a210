use std::sync::Arc;

use chrono::{Duration, Utc};
use rootsig_store::{
    Account, AccountStore, FileKeyValueStore, KeyValueStore, MemoryAuthStore, Namespace,
    NonceStore, StoreError,
};
use tempfile::TempDir;

fn make_account(username: &str) -> Account {
    Account {
        username: username.to_string(),
        key_id: vec![1, 2, 3, 4],
        public_key: vec![0x30; 91],
    }
}

#[tokio::test]
async fn test_nonce_is_single_use() {
    let store = MemoryAuthStore::new();
    let nonce = [0xabu8; 64];
    store
        .store_nonce(&nonce, Utc::now() + Duration::minutes(5))
        .await
        .unwrap();

    assert!(store.verify_and_delete(&nonce).await.unwrap());
    assert!(!store.verify_and_delete(&nonce).await.unwrap());
}

#[tokio::test]
async fn test_expired_nonce_fails_first_attempt() {
    let store = MemoryAuthStore::new();
    let nonce = [0x01u8; 64];
    store
        .store_nonce(&nonce, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    assert!(!store.verify_and_delete(&nonce).await.unwrap());
    // The expired entry was dropped on the failed attempt.
    assert_eq!(store.pending_nonces(), 0);
}

#[tokio::test]
async fn test_unknown_nonce_fails() {
    let store = MemoryAuthStore::new();
    assert!(!store.verify_and_delete(b"never issued").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumption_has_one_winner() {
    let store = Arc::new(MemoryAuthStore::new());
    let nonce = vec![0x5au8; 64];
    store
        .store_nonce(&nonce, Utc::now() + Duration::minutes(5))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = Arc::clone(&store);
        let nonce = nonce.clone();
        handles.push(tokio::spawn(async move {
            store.verify_and_delete(&nonce).await.unwrap()
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

#[tokio::test]
async fn test_account_creation_is_insert_if_absent() {
    let store = MemoryAuthStore::new();
    store.create_account(make_account("alice")).await.unwrap();

    let mut other = make_account("alice");
    other.key_id = vec![9, 9];
    let err = store.create_account(other).await.unwrap_err();
    assert!(matches!(err, StoreError::AccountExists(name) if name == "alice"));

    let stored = store.get_account("alice").await.unwrap().unwrap();
    assert_eq!(stored.key_id, vec![1, 2, 3, 4]);
    assert!(store.get_account("bob").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_has_one_winner() {
    let store = Arc::new(MemoryAuthStore::new());
    let mut handles = Vec::new();
    for i in 0..16u8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let mut account = make_account("carol");
            account.key_id = vec![i];
            store.create_account(account).await.is_ok()
        }));
    }
    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[test]
fn test_account_json_uses_base64_fields() {
    let json = serde_json::to_value(make_account("dave")).unwrap();
    assert_eq!(json["username"], "dave");
    assert_eq!(json["keyId"], "AQIDBA==");
    assert!(json["publicKey"].is_string());
}

#[tokio::test]
async fn test_file_store_persists_across_handles() {
    let dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::open(dir.path(), Namespace::well_known(Namespace::ROOT_KEYS));
    store.store("payload", "{\"version\":1}").await.unwrap();
    store.store("alpha", "a").await.unwrap();

    let reopened =
        FileKeyValueStore::open(dir.path(), Namespace::well_known(Namespace::ROOT_KEYS));
    assert_eq!(
        reopened.load("payload").await.unwrap().as_deref(),
        Some("{\"version\":1}")
    );
    assert_eq!(reopened.keys().await.unwrap(), vec!["alpha", "payload"]);
    assert!(dir.path().join("ROOT_KEYS.json").exists());
    assert!(!dir.path().join("ROOT_KEYS.json.tmp").exists());
}

#[tokio::test]
async fn test_file_store_namespaces_are_separate_files() {
    let dir = TempDir::new().unwrap();
    let roots = FileKeyValueStore::open(dir.path(), Namespace::well_known(Namespace::ROOT_KEYS));
    let nodes = roots.scoped(Namespace::well_known(Namespace::NODE_KEYS));

    roots.store("payload", "r").await.unwrap();
    nodes.store("payload", "n").await.unwrap();
    assert_eq!(roots.load("payload").await.unwrap().as_deref(), Some("r"));
    assert_eq!(nodes.load("payload").await.unwrap().as_deref(), Some("n"));

    assert!(nodes.remove("payload").await.unwrap());
    assert!(!nodes.remove("payload").await.unwrap());
    nodes.clear().await.unwrap();
    assert_eq!(roots.load("payload").await.unwrap().as_deref(), Some("r"));
}

#[tokio::test]
async fn test_file_store_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::open(
        dir.path().join("nested"),
        Namespace::parse("LOCAL_USER").unwrap(),
    );
    assert!(store.keys().await.unwrap().is_empty());
    assert!(store.load("anything").await.unwrap().is_none());
    store.clear().await.unwrap();
}

#[tokio::test]
async fn test_file_store_rejects_corrupt_document() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("NODE_KEYS.json"), b"not json").unwrap();
    let store = FileKeyValueStore::open(dir.path(), Namespace::well_known(Namespace::NODE_KEYS));
    assert!(matches!(
        store.load("payload").await,
        Err(StoreError::Serialization(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_handles_opened_separately_do_not_lose_writes() {
    let dir = TempDir::new().unwrap();
    let first = Arc::new(FileKeyValueStore::open(
        dir.path(),
        Namespace::well_known(Namespace::NODE_KEYS),
    ));
    let second = Arc::new(FileKeyValueStore::open(
        dir.path(),
        Namespace::well_known(Namespace::NODE_KEYS),
    ));

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = if i % 2 == 0 {
            Arc::clone(&first)
        } else {
            Arc::clone(&second)
        };
        handles.push(tokio::spawn(async move {
            store.store(&format!("key{i}"), "v").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(first.keys().await.unwrap().len(), 32);
}
