#[cfg(feature = "storage-fs")]
use crate::FileSnapshotStore;
#[cfg(all(not(feature = "storage-fs"), feature = "storage-memory"))]
use crate::MemorySnapshotStore;
#[cfg(not(any(feature = "storage-fs", feature = "storage-memory")))]
use crate::StorageError;
use crate::{SnapshotStore, StorageResult};
use std::sync::Arc;
use vetpro_core::Config;

/// Create the snapshot store used by demo mode.
///
/// Uses the filesystem under `DEMO_STORAGE_PATH`; when that backend is compiled out the
/// in-memory store is used and demo data lasts for the process lifetime only.
pub async fn create_snapshot_store(config: &Config) -> StorageResult<Arc<dyn SnapshotStore>> {
    #[cfg(feature = "storage-fs")]
    {
        let store = FileSnapshotStore::new(config.demo_storage_path.clone()).await?;
        tracing::info!(
            path = %config.demo_storage_path.display(),
            "Using filesystem snapshot store"
        );
        Ok(Arc::new(store))
    }

    #[cfg(all(not(feature = "storage-fs"), feature = "storage-memory"))]
    {
        tracing::warn!(
            path = %config.demo_storage_path.display(),
            "Filesystem snapshot store not available, demo data will not persist"
        );
        Ok(Arc::new(MemorySnapshotStore::new()))
    }

    #[cfg(not(any(feature = "storage-fs", feature = "storage-memory")))]
    {
        let _ = config;
        Err(StorageError::ConfigError(
            "No snapshot backend available (enable storage-fs or storage-memory)".to_string(),
        ))
    }
}
