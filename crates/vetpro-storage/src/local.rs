use crate::traits::{validate_key, SnapshotBackend, SnapshotStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Filesystem snapshot store. Each key is one `<key>.json` file under `base_path`.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    base_path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a new FileSnapshotStore, creating `base_path` if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create snapshot directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(FileSnapshotStore { base_path })
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(
                    path = %path.display(),
                    key = %key,
                    size_bytes = bytes.len(),
                    "Snapshot read"
                );
                String::from_utf8(bytes).map(Some).map_err(|e| {
                    StorageError::Malformed(format!("{} is not valid UTF-8: {}", path.display(), e))
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        // Write to a sibling file first so readers never observe a partial snapshot.
        let tmp_path = path.with_extension("json.tmp");
        let size = value.len();

        let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        file.write_all(value.as_bytes()).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", tmp_path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to move snapshot into place {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            "Snapshot written"
        );

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete snapshot {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> SnapshotBackend {
        SnapshotBackend::Filesystem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();

        store
            .put("clients_demo_v10_abc", "[1,2,3]".to_string())
            .await
            .unwrap();

        let value = store.get("clients_demo_v10_abc").await.unwrap();
        assert_eq!(value.as_deref(), Some("[1,2,3]"));
        assert!(dir.path().join("clients_demo_v10_abc.json").exists());
        assert!(!dir.path().join("clients_demo_v10_abc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_absent_key_reads_none() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();
        assert_eq!(store.get("pets_demo_v10_abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_reads_as_malformed() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("clients_demo_v10_abc.json"), [0xff, 0xfe, 0x5b]).unwrap();

        let result = store.get("clients_demo_v10_abc").await;
        assert!(matches!(result, Err(StorageError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_put_overwrites_whole_value() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();
        store.put("k", "first value".to_string()).await.unwrap();
        store.put("k", "2nd".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2nd"));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();

        let result = store.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.remove("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.put("a/b", String::new()).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_remove_nonexistent() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).await.unwrap();
        assert!(store.remove("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("demo");
        let store = FileSnapshotStore::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.backend_type(), SnapshotBackend::Filesystem);
    }
}
