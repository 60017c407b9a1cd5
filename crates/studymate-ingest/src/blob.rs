//! Raw upload storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use studymate_core::defaults::BLOB_PREFIX;
use studymate_core::{BlobStore, Error, Result};

/// Storage path for a raw upload: `files/{upload-ms}_{name}`.
pub fn blob_path(file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        BLOB_PREFIX,
        Utc::now().timestamp_millis(),
        file_name
    )
}

/// Blob store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, rejecting anything that escapes it.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(Error::Storage(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }
        tokio::fs::write(&target, data)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {:?}: {}", target, e)))?;

        debug!(path, bytes = data.len(), "Stored upload");
        Ok(target.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blob_path_format() {
        let path = blob_path("bio.txt");
        let rest = path.strip_prefix("files/").unwrap();
        let (millis, name) = rest.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(name, "bio.txt");
    }

    #[tokio::test]
    async fn test_upload_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let location = store.upload("files/1_bio.txt", b"cells").await.unwrap();
        assert_eq!(tokio::fs::read(&location).await.unwrap(), b"cells");
        assert!(location.ends_with("1_bio.txt"));
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        for bad in ["../escape.txt", "/etc/passwd", "files/../../x", ""] {
            let err = store.upload(bad, b"x").await.unwrap_err();
            assert!(matches!(err, Error::Storage(_)), "{} should be rejected", bad);
        }
    }
}
