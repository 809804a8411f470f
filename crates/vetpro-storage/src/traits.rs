//! Snapshot storage abstraction
//!
//! This module defines the SnapshotStore trait that all snapshot backends must implement.

use async_trait::async_trait;
use thiserror::Error;

/// Snapshot storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// The stored bytes are not a readable snapshot.
    #[error("Malformed snapshot: {0}")]
    Malformed(String),

    #[error("Invalid snapshot key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for snapshot operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotBackend {
    Filesystem,
    Memory,
}

/// Key/value store holding one serialized collection per key.
///
/// There is no locking across processes: the last `put` for a key wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the raw value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the whole value stored under `key`.
    async fn put(&self, key: &str, value: String) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    fn backend_type(&self) -> SnapshotBackend;
}

/// Reject keys that could escape the store's namespace.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Snapshot key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Snapshot key contains invalid characters".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StorageError::InvalidKey(format!(
            "Snapshot key '{}' may only contain letters, digits, '-' and '_'",
            key
        )));
    }
    Ok(())
}
