//! JSON-file session store backend.
//!
//! Persists session entries as a single flat JSON object, the durable
//! analogue of browser local storage. Writes go to a sibling temp file
//! first and are moved into place with a rename, so a crash mid-write
//! leaves the previous snapshot intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use gambit_store::{KvError, KvStore};

/// File-backed [`KvStore`].
///
/// All entries live in memory behind a mutex; every mutation rewrites
/// the whole file. The session keyspace is two keys, so the rewrite is
/// trivially cheap.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKvStore {
    /// Open a store at `path`, loading any existing snapshot.
    ///
    /// A missing file is treated as an empty store; the file is created
    /// on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, KvError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| KvError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(KvError::Io(e.to_string())),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), KvError> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| KvError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| KvError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| KvError::Io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<bool, KvError> {
        let mut entries = self.entries.lock().await;
        let existed = entries.remove(key).is_some();
        if existed {
            self.flush(&entries).await?;
        }
        Ok(existed)
    }
}
