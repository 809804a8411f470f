use vetpro_core::models::{Tenant, TenantSettingsForm};
use vetpro_core::{AppError, FormInput};
use vetpro_gateway::SettingsGateway;

use super::logged;
use crate::context::TenantContext;

#[derive(Clone)]
pub struct SettingsService {
    ctx: TenantContext,
}

impl SettingsService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Current clinic data, including any settings saved since the tenant was resolved.
    pub async fn load(&self) -> Result<Tenant, AppError> {
        logged(
            "load clinic settings",
            self.ctx.gateway().load_tenant(self.ctx.tenant()).await,
        )
    }

    pub async fn form(&self) -> Result<TenantSettingsForm, AppError> {
        Ok(TenantSettingsForm::from_tenant(&self.load().await?))
    }

    /// Save the settings and return the updated clinic.
    pub async fn update(&self, form: TenantSettingsForm) -> Result<Tenant, AppError> {
        let update = form.into_input()?;
        let current = self.load().await?;
        let tenant = logged(
            "update clinic settings",
            self.ctx
                .gateway()
                .update_tenant_settings(&current, &update)
                .await,
        )?;
        tracing::info!(tenant_id = %tenant.id, "Clinic settings updated");
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::demo_context;

    #[tokio::test]
    async fn test_update_round_trip() {
        let service = SettingsService::new(demo_context());
        let mut form = service.form().await.unwrap();
        form.name = "Veterinaria San Roque Norte".to_string();
        form.currency = "usd".to_string();
        form.timezone = "America/Montevideo".to_string();

        let updated = service.update(form).await.unwrap();
        assert_eq!(updated.settings.currency, "USD");
        assert_eq!(service.load().await.unwrap(), updated);
        assert!(updated.is_demo);
    }

    #[tokio::test]
    async fn test_invalid_timezone_rejected() {
        let service = SettingsService::new(demo_context());
        let mut form = service.form().await.unwrap();
        form.timezone = "Mars/Olympus".to_string();

        let err = service.update(form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            service.load().await.unwrap().settings.timezone,
            "America/Argentina/Buenos_Aires"
        );
    }
}
