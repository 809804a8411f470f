//! VetPro Storage Library
//!
//! Local snapshot storage used by demo mode. A snapshot is a whole serialized collection
//! stored under one tenant-namespaced key; reads and writes always move the full value.
//!
//! # Key format
//!
//! `<entity>_demo_<schema version>_<tenant_id>`, for example
//! `clients_demo_v10_11111111-1111-1111-1111-111111111111`.
//!
//! Keys may only contain ASCII letters, digits, `-` and `_`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-fs")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_snapshot_store;
pub use keys::{snapshot_key, SnapshotEntity};
#[cfg(feature = "storage-fs")]
pub use local::FileSnapshotStore;
#[cfg(feature = "storage-memory")]
pub use memory::MemorySnapshotStore;
pub use traits::{SnapshotBackend, SnapshotStore, StorageError, StorageResult};

impl From<StorageError> for vetpro_core::AppError {
    fn from(err: StorageError) -> Self {
        vetpro_core::AppError::Storage(err.to_string())
    }
}
