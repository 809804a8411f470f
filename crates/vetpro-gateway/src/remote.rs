//! Hosted backend: tenant-scoped queries through the Postgres repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vetpro_core::models::{
    Appointment, AppointmentInput, AppointmentStatus, AppointmentWithDetails, Client, ClientInput,
    ClientWithStats, MedicalRecord, MedicalRecordInput, Pet, PetInput, PetWithOwner,
    StatusFilter, Tenant, TenantSettingsUpdate,
};
use vetpro_core::AppError;
use vetpro_db::{
    AppointmentRepository, ClientRepository, MedicalRecordRepository, PetRepository,
    TenantRepository,
};

use crate::traits::{
    AppointmentGateway, ClientGateway, DashboardGateway, GatewayMode, MedicalRecordGateway,
    PetGateway, SettingsGateway, TenantScoped,
};

#[derive(Clone)]
pub struct RemoteGateway {
    tenant_id: Uuid,
    clients: ClientRepository,
    pets: PetRepository,
    appointments: AppointmentRepository,
    records: MedicalRecordRepository,
    tenants: TenantRepository,
}

impl RemoteGateway {
    pub fn new(pool: PgPool, tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            clients: ClientRepository::new(pool.clone()),
            pets: PetRepository::new(pool.clone()),
            appointments: AppointmentRepository::new(pool.clone()),
            records: MedicalRecordRepository::new(pool.clone()),
            tenants: TenantRepository::new(pool),
        }
    }
}

impl TenantScoped for RemoteGateway {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    fn mode(&self) -> GatewayMode {
        GatewayMode::Remote
    }
}

#[async_trait]
impl ClientGateway for RemoteGateway {
    async fn list_clients(&self) -> Result<Vec<ClientWithStats>, AppError> {
        self.clients.list_clients_with_stats(self.tenant_id).await
    }

    async fn list_clients_by_name(&self) -> Result<Vec<Client>, AppError> {
        self.clients.list_clients_by_name(self.tenant_id).await
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        self.clients.get_client(self.tenant_id, id).await
    }

    async fn create_client(&self, input: ClientInput) -> Result<Client, AppError> {
        self.clients.create_client(self.tenant_id, &input).await
    }

    async fn update_client(&self, id: Uuid, input: ClientInput) -> Result<Client, AppError> {
        self.clients
            .update_client(self.tenant_id, id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Client", id))
    }

    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError> {
        self.clients.delete_client(self.tenant_id, id).await
    }
}

#[async_trait]
impl PetGateway for RemoteGateway {
    async fn list_pets(&self) -> Result<Vec<PetWithOwner>, AppError> {
        self.pets.list_pets_with_owner(self.tenant_id).await
    }

    async fn list_pets_by_name(&self) -> Result<Vec<PetWithOwner>, AppError> {
        self.pets.list_pets_by_name(self.tenant_id).await
    }

    async fn list_pets_for_client(&self, client_id: Uuid) -> Result<Vec<Pet>, AppError> {
        self.pets
            .list_pets_for_client(self.tenant_id, client_id)
            .await
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, AppError> {
        self.pets.get_pet(self.tenant_id, id).await
    }

    async fn create_pet(&self, input: PetInput) -> Result<Pet, AppError> {
        self.pets.create_pet(self.tenant_id, &input).await
    }

    async fn update_pet(&self, id: Uuid, input: PetInput) -> Result<Pet, AppError> {
        self.pets
            .update_pet(self.tenant_id, id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Pet", id))
    }

    async fn delete_pet(&self, id: Uuid) -> Result<bool, AppError> {
        self.pets.delete_pet(self.tenant_id, id).await
    }
}

#[async_trait]
impl AppointmentGateway for RemoteGateway {
    async fn list_appointments(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let status = match filter {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status),
        };
        self.appointments
            .list_appointments_with_details(self.tenant_id, status)
            .await
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<AppointmentWithDetails>, AppError> {
        self.appointments
            .get_appointment_with_details(self.tenant_id, id)
            .await
    }

    async fn create_appointment(&self, input: AppointmentInput) -> Result<Appointment, AppError> {
        self.appointments
            .create_appointment(self.tenant_id, &input)
            .await
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        input: AppointmentInput,
    ) -> Result<Appointment, AppError> {
        self.appointments
            .update_appointment(self.tenant_id, id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment", id))
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        self.appointments
            .update_status(self.tenant_id, id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment", id))
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, AppError> {
        self.appointments
            .delete_appointment(self.tenant_id, id)
            .await
    }
}

#[async_trait]
impl MedicalRecordGateway for RemoteGateway {
    async fn list_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, AppError> {
        self.records
            .list_records_for_pet(self.tenant_id, pet_id)
            .await
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, AppError> {
        self.records.get_record(self.tenant_id, id).await
    }

    async fn create_record(&self, input: MedicalRecordInput) -> Result<MedicalRecord, AppError> {
        self.records.create_record(self.tenant_id, &input).await
    }

    async fn update_record(
        &self,
        id: Uuid,
        input: MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        self.records
            .update_record(self.tenant_id, id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Medical record", id))
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, AppError> {
        self.records.delete_record(self.tenant_id, id).await
    }
}

#[async_trait]
impl SettingsGateway for RemoteGateway {
    async fn load_tenant(&self, fallback: &Tenant) -> Result<Tenant, AppError> {
        Ok(self
            .tenants
            .get_tenant_by_id(self.tenant_id)
            .await?
            .unwrap_or_else(|| fallback.clone()))
    }

    async fn update_tenant_settings(
        &self,
        _current: &Tenant,
        update: &TenantSettingsUpdate,
    ) -> Result<Tenant, AppError> {
        self.tenants.update_settings(self.tenant_id, update).await
    }
}

#[async_trait]
impl DashboardGateway for RemoteGateway {
    async fn count_pets(&self) -> Result<i64, AppError> {
        self.pets.count_pets(self.tenant_id).await
    }

    async fn count_appointments_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        self.appointments
            .count_between(self.tenant_id, start, end)
            .await
    }

    async fn count_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<i64, AppError> {
        self.appointments
            .count_by_status(self.tenant_id, status)
            .await
    }

    async fn list_upcoming(
        &self,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.appointments
            .list_upcoming(self.tenant_id, from, limit)
            .await
    }
}
