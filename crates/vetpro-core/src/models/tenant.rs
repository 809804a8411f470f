use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_PRIMARY_COLOR, DEFAULT_TIMEZONE, DEMO_TENANT_ID,
};
use crate::error::AppError;
use crate::validation::{normalize_optional, validate_currency, validate_timezone, FormInput};

/// Subscription plan of a clinic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "tenant_plan", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantPlan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantSettings {
    pub primary_color: String,
    pub currency: String,
    pub timezone: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// A clinic account. Every other entity is partitioned by its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub plan: TenantPlan,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub settings: TenantSettings,
    #[serde(default)]
    pub is_demo: bool,
}

impl Tenant {
    /// The built-in clinic used whenever nobody is signed in.
    pub fn demo() -> Self {
        Self {
            id: DEMO_TENANT_ID,
            name: "Veterinaria San Roque".to_string(),
            slug: "san-roque".to_string(),
            logo_url: Some(
                "https://images.unsplash.com/photo-1584132967334-10e028bd69f7?w=100&h=100&fit=crop"
                    .to_string(),
            ),
            plan: TenantPlan::Pro,
            phone: Some("+54 11 4444-5555".to_string()),
            address: Some("Calle Ficticia 123, Buenos Aires".to_string()),
            settings: TenantSettings {
                primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
                currency: "ARS".to_string(),
                timezone: "America/Argentina/Buenos_Aires".to_string(),
            },
            is_demo: true,
        }
    }

    /// Tenant timezone. Unknown names fall back to UTC.
    pub fn timezone(&self) -> Tz {
        self.settings.timezone.parse::<Tz>().unwrap_or(Tz::UTC)
    }

    pub fn apply_settings(&mut self, update: &TenantSettingsUpdate) {
        self.name = update.name.clone();
        self.phone = update.phone.clone();
        self.address = update.address.clone();
        self.settings.currency = update.currency.clone();
        self.settings.timezone = update.timezone.clone();
    }
}

/// Flat `tenants` row as stored by the hosted backend.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub plan: Option<TenantPlan>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub primary_color: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        let defaults = TenantSettings::default();
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            logo_url: row.logo_url,
            plan: row.plan.unwrap_or_default(),
            phone: row.phone,
            address: row.address,
            settings: TenantSettings {
                primary_color: row.primary_color.unwrap_or(defaults.primary_color),
                currency: row.currency.unwrap_or(defaults.currency),
                timezone: row.timezone.unwrap_or(defaults.timezone),
            },
            is_demo: false,
        }
    }
}

/// Clinic settings form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TenantSettingsForm {
    #[validate(length(min = 1, message = "Clinic name is required"))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub currency: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettingsUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub timezone: String,
}

impl TenantSettingsForm {
    /// Pre-fill the form with the tenant's current values.
    pub fn from_tenant(tenant: &Tenant) -> Self {
        Self {
            name: tenant.name.clone(),
            phone: tenant.phone.clone(),
            address: tenant.address.clone(),
            currency: tenant.settings.currency.clone(),
            timezone: tenant.settings.timezone.clone(),
        }
    }
}

impl FormInput for TenantSettingsForm {
    type Output = TenantSettingsUpdate;

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.phone = normalize_optional(self.phone.take());
        self.address = normalize_optional(self.address.take());
        self.currency = self.currency.trim().to_uppercase();
        self.timezone = self.timezone.trim().to_string();
    }

    fn build(self) -> Result<Self::Output, AppError> {
        let mut errors = validator::ValidationErrors::new();
        if let Err(e) = validate_currency(&self.currency) {
            errors.add("currency", e);
        }
        if let Err(e) = validate_timezone(&self.timezone) {
            errors.add("timezone", e);
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(TenantSettingsUpdate {
            name: self.name,
            phone: self.phone,
            address: self.address,
            currency: self.currency,
            timezone: self.timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_tenant_identity() {
        let tenant = Tenant::demo();
        assert_eq!(
            tenant.id.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        assert!(tenant.is_demo);
        assert_eq!(tenant.plan, TenantPlan::Pro);
        assert_eq!(tenant.timezone(), chrono_tz::America::Argentina::Buenos_Aires);
    }

    #[test]
    fn test_row_falls_back_to_default_settings() {
        let now = Utc::now();
        let row = TenantRow {
            id: Uuid::new_v4(),
            name: "Clinica Norte".to_string(),
            slug: "norte".to_string(),
            logo_url: None,
            plan: None,
            phone: None,
            address: None,
            primary_color: None,
            currency: None,
            timezone: None,
            created_at: now,
            updated_at: now,
        };
        let tenant = Tenant::from(row);
        assert_eq!(tenant.settings, TenantSettings::default());
        assert_eq!(tenant.plan, TenantPlan::Free);
        assert!(!tenant.is_demo);
        assert_eq!(tenant.timezone(), Tz::UTC);
    }

    #[test]
    fn test_settings_form_rejects_unknown_timezone() {
        let mut form = TenantSettingsForm::from_tenant(&Tenant::demo());
        form.timezone = "Mars/Olympus".to_string();
        let err = form.into_input().unwrap_err();
        assert!(err.to_string().contains("timezone"));
    }

    #[test]
    fn test_settings_form_normalizes_currency() {
        let mut form = TenantSettingsForm::from_tenant(&Tenant::demo());
        form.currency = " usd ".to_string();
        form.phone = Some("  ".to_string());
        let update = form.into_input().unwrap();
        assert_eq!(update.currency, "USD");
        assert_eq!(update.phone, None);
    }

    #[test]
    fn test_apply_settings_keeps_branding() {
        let mut tenant = Tenant::demo();
        let update = TenantSettingsUpdate {
            name: "San Roque Centro".to_string(),
            phone: None,
            address: Some("Av. Siempre Viva 742".to_string()),
            currency: "USD".to_string(),
            timezone: "UTC".to_string(),
        };
        tenant.apply_settings(&update);
        assert_eq!(tenant.name, "San Roque Centro");
        assert_eq!(tenant.settings.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(tenant.settings.currency, "USD");
        assert_eq!(tenant.slug, "san-roque");
    }
}
