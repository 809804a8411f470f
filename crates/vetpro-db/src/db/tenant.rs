use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::{Tenant, TenantRow, TenantSettingsUpdate};
use vetpro_core::AppError;

const TENANT_COLUMNS: &str = "id, name, slug, logo_url, plan, phone, address, primary_color, \
                              currency, timezone, created_at, updated_at";

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get tenant by ID
    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "select"))]
    pub async fn get_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let row = sqlx::query_as::<Postgres, TenantRow>(&format!(
            "SELECT {} FROM tenants WHERE id = $1",
            TENANT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch tenant by ID");
            AppError::from(e)
        })?;

        Ok(row.map(Tenant::from))
    }

    /// Update the clinic's contact and locale settings. Branding and plan are left as is.
    #[tracing::instrument(skip(self, update), fields(db.table = "tenants", db.operation = "update"))]
    pub async fn update_settings(
        &self,
        tenant_id: Uuid,
        update: &TenantSettingsUpdate,
    ) -> Result<Tenant, AppError> {
        let row = sqlx::query_as::<Postgres, TenantRow>(&format!(
            r#"
            UPDATE tenants
            SET name = $2, phone = $3, address = $4, currency = $5, timezone = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TENANT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.currency)
        .bind(&update.timezone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update tenant settings");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found("Tenant", tenant_id))?;

        tracing::info!(tenant_id = %tenant_id, "Updated tenant settings");
        Ok(Tenant::from(row))
    }
}
