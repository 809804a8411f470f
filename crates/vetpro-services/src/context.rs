use std::sync::Arc;

use chrono_tz::Tz;
use vetpro_core::models::Tenant;
use vetpro_core::AppError;
use vetpro_gateway::{Gateway, TenantScoped};

/// Active tenant plus the gateway bound to it, handed to every feature service.
#[derive(Clone)]
pub struct TenantContext {
    tenant: Arc<Tenant>,
    gateway: Arc<dyn Gateway>,
}

impl TenantContext {
    pub fn new(tenant: Tenant, gateway: Arc<dyn Gateway>) -> Result<Self, AppError> {
        if gateway.tenant_id() != tenant.id {
            return Err(AppError::TenantContext(format!(
                "Gateway is bound to tenant {} but the active tenant is {}",
                gateway.tenant_id(),
                tenant.id
            )));
        }
        Ok(Self {
            tenant: Arc::new(tenant),
            gateway,
        })
    }

    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn timezone(&self) -> Tz {
        self.tenant.timezone()
    }

    /// Same gateway, refreshed tenant data (after a settings change).
    pub fn with_tenant(&self, tenant: Tenant) -> Result<Self, AppError> {
        Self::new(tenant, self.gateway.clone())
    }
}
