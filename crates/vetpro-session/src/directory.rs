use async_trait::async_trait;
use uuid::Uuid;
use vetpro_core::models::{Tenant, UserProfile};
use vetpro_core::AppError;

/// Lookups the resolver needs to go from a user id to a tenant.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError>;
}

/// Directory for runs without a database: every lookup comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

#[async_trait]
impl TenantDirectory for EmptyDirectory {
    async fn profile(&self, _user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(None)
    }

    async fn tenant(&self, _tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        Ok(None)
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgTenantDirectory;

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::PgPool;
    use vetpro_db::{TenantRepository, UserProfileRepository};

    #[derive(Clone)]
    pub struct PgTenantDirectory {
        profiles: UserProfileRepository,
        tenants: TenantRepository,
    }

    impl PgTenantDirectory {
        pub fn new(pool: PgPool) -> Self {
            Self {
                profiles: UserProfileRepository::new(pool.clone()),
                tenants: TenantRepository::new(pool),
            }
        }
    }

    #[async_trait]
    impl TenantDirectory for PgTenantDirectory {
        async fn profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
            self.profiles.get_profile(user_id).await
        }

        async fn tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
            self.tenants.get_tenant_by_id(tenant_id).await
        }
    }
}
