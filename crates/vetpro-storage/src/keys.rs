//! Shared key generation for snapshot backends.
//!
//! Key format: `<entity>_demo_<schema version>_<tenant_id>`.

use std::fmt;

use uuid::Uuid;
use vetpro_core::constants::SNAPSHOT_SCHEMA_VERSION;

/// Collections persisted in demo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotEntity {
    Clients,
    Pets,
    Appointments,
    Records,
    Tenant,
}

impl SnapshotEntity {
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotEntity::Clients => "clients",
            SnapshotEntity::Pets => "pets",
            SnapshotEntity::Appointments => "appointments",
            SnapshotEntity::Records => "records",
            SnapshotEntity::Tenant => "tenant",
        }
    }
}

impl fmt::Display for SnapshotEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Generate the snapshot key for the given collection and tenant.
pub fn snapshot_key(entity: SnapshotEntity, tenant_id: Uuid) -> String {
    format!(
        "{}_demo_{}_{}",
        entity.prefix(),
        SNAPSHOT_SCHEMA_VERSION,
        tenant_id
    )
}
