use std::sync::Arc;

#[cfg(feature = "remote")]
use sqlx::PgPool;
use vetpro_core::models::Tenant;
use vetpro_core::AppError;
use vetpro_storage::SnapshotStore;

use crate::local::LocalGateway;
#[cfg(feature = "remote")]
use crate::remote::RemoteGateway;
use crate::traits::Gateway;

/// Builds the gateway for a resolved tenant.
///
/// Demo tenants always get the local snapshot backend. Live tenants need a database pool.
#[derive(Clone)]
pub struct GatewayFactory {
    #[cfg(feature = "remote")]
    pool: Option<PgPool>,
    store: Arc<dyn SnapshotStore>,
}

impl GatewayFactory {
    /// Factory that can only serve demo tenants.
    pub fn local_only(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            #[cfg(feature = "remote")]
            pool: None,
            store,
        }
    }

    #[cfg(feature = "remote")]
    pub fn new(pool: Option<PgPool>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { pool, store }
    }

    pub fn gateway_for(&self, tenant: &Tenant) -> Result<Arc<dyn Gateway>, AppError> {
        if tenant.is_demo {
            tracing::debug!(tenant_id = %tenant.id, "Using local demo gateway");
            return Ok(Arc::new(LocalGateway::new(self.store.clone(), tenant.id)));
        }

        #[cfg(feature = "remote")]
        if let Some(pool) = &self.pool {
            tracing::debug!(tenant_id = %tenant.id, "Using remote gateway");
            return Ok(Arc::new(RemoteGateway::new(pool.clone(), tenant.id)));
        }

        Err(AppError::TenantContext(format!(
            "Clinic '{}' requires a database connection, but none is configured",
            tenant.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{GatewayMode, TenantScoped};
    use vetpro_storage::MemorySnapshotStore;

    #[test]
    fn test_demo_tenant_gets_local_gateway() {
        let factory = GatewayFactory::local_only(Arc::new(MemorySnapshotStore::new()));
        let tenant = Tenant::demo();
        let gateway = factory.gateway_for(&tenant).unwrap();
        assert_eq!(gateway.mode(), GatewayMode::Local);
        assert_eq!(gateway.tenant_id(), tenant.id);
    }

    #[test]
    fn test_live_tenant_without_pool_is_rejected() {
        let factory = GatewayFactory::local_only(Arc::new(MemorySnapshotStore::new()));
        let mut tenant = Tenant::demo();
        tenant.is_demo = false;
        let err = factory.gateway_for(&tenant).err().unwrap();
        assert!(matches!(err, AppError::TenantContext(_)));
    }
}
