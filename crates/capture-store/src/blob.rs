//! Blob backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::api::BlobStore;
use crate::errors::CaptureError;
use crate::CaptureResult;

/// Filesystem-backed blob store rooted at a directory; keys map to
/// relative paths beneath it.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save_bytes(&self, key: &str, data: &[u8], _content_type: &str) -> CaptureResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| CaptureError::storage(key, err.to_string()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|err| CaptureError::storage(key, err.to_string()))?;
        debug!(key, bytes = data.len(), "artifact written");
        Ok(())
    }

    async fn get_bytes(&self, key: &str) -> CaptureResult<Vec<u8>> {
        tokio::fs::read(self.path_for(key))
            .await
            .map_err(|err| CaptureError::storage(key, err.to_string()))
    }
}

/// In-memory blob store for tests and dry runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.blobs.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save_bytes(&self, key: &str, data: &[u8], _content_type: &str) -> CaptureResult<()> {
        self.blobs.lock().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get_bytes(&self, key: &str) -> CaptureResult<Vec<u8>> {
        self.blobs
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| CaptureError::storage(key, "no such blob"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_store_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .save_bytes("app/task/run/step_1_dom.html", b"<html></html>", "text/html")
            .await
            .unwrap();
        let bytes = store.get_bytes("app/task/run/step_1_dom.html").await.unwrap();
        assert_eq!(bytes, b"<html></html>");
    }

    #[tokio::test]
    async fn memory_store_reports_missing_keys() {
        let store = MemoryBlobStore::new();
        assert!(store.get_bytes("nope").await.is_err());
    }
}
