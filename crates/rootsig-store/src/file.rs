//! JSON-file-backed key-value store.
//!
//! Each namespace lives in `<dir>/<NAMESPACE>.json` as a single JSON object.
//! Writes go to a `.json.tmp` sibling first and are then renamed over the
//! target, so a crash mid-write leaves the previous document intact.
//!
//! Every handle on the same document within a process shares one lock, so
//! separately opened handles do not lose each other's updates. Other
//! processes writing the same directory are not coordinated.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::namespace::Namespace;
use crate::traits::KeyValueStore;

type Document = BTreeMap<String, String>;

static DOCUMENT_LOCKS: OnceLock<DashMap<PathBuf, Arc<Mutex<()>>>> = OnceLock::new();

fn document_lock(path: &Path) -> Arc<Mutex<()>> {
    let locks = DOCUMENT_LOCKS.get_or_init(DashMap::new);
    let lock = locks.entry(path.to_path_buf()).or_default();
    Arc::clone(&lock)
}

/// Key-value store persisted as one JSON file per namespace.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    namespace: Namespace,
    // Shared by every handle on the same document path.
    lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    /// Opens (lazily) the store for `namespace` under `dir`.
    ///
    /// The directory is canonicalized when it already exists, so different
    /// spellings of one directory share a lock.
    pub fn open(dir: impl AsRef<Path>, namespace: Namespace) -> Self {
        let dir = dir.as_ref();
        let dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let lock = document_lock(&document_path(&dir, &namespace));
        Self {
            dir,
            namespace,
            lock,
        }
    }

    /// Returns a handle on another namespace in the same directory.
    pub fn scoped(&self, namespace: Namespace) -> Self {
        Self::open(&self.dir, namespace)
    }

    /// Path of the backing JSON document.
    pub fn path(&self) -> PathBuf {
        document_path(&self.dir, &self.namespace)
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path();
        let tmp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(doc)?;

        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| {
            error!(
                event = "store_write_failure",
                path = %tmp_path.display(),
                error = %e,
                "failed to write temp file"
            );
            e
        })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            error!(
                event = "store_rename_failure",
                from = %tmp_path.display(),
                to = %path.display(),
                error = %e,
                "failed to rename temp file"
            );
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        debug!(event = "store_written", path = %path.display(), entries = doc.len());
        Ok(())
    }
}

fn document_path(dir: &Path, namespace: &Namespace) -> PathBuf {
    dir.join(format!("{}.json", namespace.as_ref()))
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc).await
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.into_keys().collect())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let existed = doc.remove(key).is_some();
        if existed {
            self.write_document(&doc).await?;
        }
        Ok(existed)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
