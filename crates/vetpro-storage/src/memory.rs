use crate::traits::{validate_key, SnapshotBackend, SnapshotStore, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process snapshot store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn backend_type(&self) -> SnapshotBackend {
        SnapshotBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemorySnapshotStore::new();
        let other = store.clone();
        store.put("tenant_demo_v10_x", "{}".to_string()).await.unwrap();
        assert_eq!(other.get("tenant_demo_v10_x").await.unwrap().as_deref(), Some("{}"));
        other.remove("tenant_demo_v10_x").await.unwrap();
        assert!(store.is_empty().await);
    }
}
