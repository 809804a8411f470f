//! Gateway capability traits
//!
//! One trait per entity. Implementations are bound to a single tenant and must never
//! return or mutate rows that belong to another tenant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use vetpro_core::models::{
    Appointment, AppointmentInput, AppointmentStatus, AppointmentWithDetails, Client, ClientInput,
    ClientWithStats, MedicalRecord, MedicalRecordInput, Pet, PetInput, PetWithOwner,
    StatusFilter, Tenant, TenantSettingsUpdate,
};
use vetpro_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Remote,
    Local,
}

pub trait TenantScoped: Send + Sync {
    fn tenant_id(&self) -> Uuid;

    fn mode(&self) -> GatewayMode;
}

#[async_trait]
pub trait ClientGateway: Send + Sync {
    /// Clients newest first, each with its pet count.
    async fn list_clients(&self) -> Result<Vec<ClientWithStats>, AppError>;

    /// Clients ordered by first and last name.
    async fn list_clients_by_name(&self) -> Result<Vec<Client>, AppError>;

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError>;

    async fn create_client(&self, input: ClientInput) -> Result<Client, AppError>;

    async fn update_client(&self, id: Uuid, input: ClientInput) -> Result<Client, AppError>;

    /// Delete a client with its pets and their appointments and records.
    /// Returns `false` when the client does not exist in this tenant.
    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait PetGateway: Send + Sync {
    /// Pets newest first, joined with their owner.
    async fn list_pets(&self) -> Result<Vec<PetWithOwner>, AppError>;

    /// Pets ordered by name, joined with their owner.
    async fn list_pets_by_name(&self) -> Result<Vec<PetWithOwner>, AppError>;

    async fn list_pets_for_client(&self, client_id: Uuid) -> Result<Vec<Pet>, AppError>;

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, AppError>;

    /// The owner must exist in this tenant.
    async fn create_pet(&self, input: PetInput) -> Result<Pet, AppError>;

    async fn update_pet(&self, id: Uuid, input: PetInput) -> Result<Pet, AppError>;

    /// Delete a pet with its appointments and records.
    async fn delete_pet(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    /// Appointments by date ascending, joined with pet and client.
    async fn list_appointments(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<AppointmentWithDetails>, AppError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<AppointmentWithDetails>, AppError>;

    /// The pet must exist and belong to `input.client_id`.
    async fn create_appointment(&self, input: AppointmentInput) -> Result<Appointment, AppError>;

    async fn update_appointment(
        &self,
        id: Uuid,
        input: AppointmentInput,
    ) -> Result<Appointment, AppError>;

    /// Any status may move to any other.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError>;

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait MedicalRecordGateway: Send + Sync {
    /// Records of one pet, newest first.
    async fn list_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, AppError>;

    async fn get_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, AppError>;

    async fn create_record(&self, input: MedicalRecordInput) -> Result<MedicalRecord, AppError>;

    /// Updates clinical fields only; the record keeps its original date and pet.
    async fn update_record(
        &self,
        id: Uuid,
        input: MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError>;

    async fn delete_record(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait SettingsGateway: Send + Sync {
    /// Stored version of the tenant, or `fallback` when nothing was persisted yet.
    async fn load_tenant(&self, fallback: &Tenant) -> Result<Tenant, AppError>;

    async fn update_tenant_settings(
        &self,
        current: &Tenant,
        update: &TenantSettingsUpdate,
    ) -> Result<Tenant, AppError>;
}

#[async_trait]
pub trait DashboardGateway: Send + Sync {
    async fn count_pets(&self) -> Result<i64, AppError>;

    /// Appointments whose date-time falls in `[start, end)`.
    async fn count_appointments_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    async fn count_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<i64, AppError>;

    /// Next `limit` appointments from `from` onwards, ascending.
    async fn list_upcoming(
        &self,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AppointmentWithDetails>, AppError>;
}

/// Full capability set handed to feature modules.
pub trait Gateway:
    TenantScoped
    + ClientGateway
    + PetGateway
    + AppointmentGateway
    + MedicalRecordGateway
    + SettingsGateway
    + DashboardGateway
{
}

impl<T> Gateway for T where
    T: TenantScoped
        + ClientGateway
        + PetGateway
        + AppointmentGateway
        + MedicalRecordGateway
        + SettingsGateway
        + DashboardGateway
{
}
