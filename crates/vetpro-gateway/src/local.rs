//! Demo-mode gateway over the local snapshot store.
//!
//! Every collection lives under its own `<entity>_demo_v10_<tenant_id>` key and is read and
//! written as a whole. Related entities are stored normalized and joined at read time, so a
//! listing always reflects the current client and pet data. Cascading deletes are applied
//! here by hand. There is no locking: the last write of a collection wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use vetpro_core::models::{
    Appointment, AppointmentInput, AppointmentStatus, AppointmentWithDetails, Client, ClientInput,
    ClientWithStats, MedicalRecord, MedicalRecordInput, Pet, PetInput, PetWithOwner,
    StatusFilter, Tenant, TenantSettingsUpdate,
};
use vetpro_core::AppError;
use vetpro_storage::{snapshot_key, SnapshotEntity, SnapshotStore, StorageError};

use crate::seed;
use crate::traits::{
    AppointmentGateway, ClientGateway, DashboardGateway, GatewayMode, MedicalRecordGateway,
    PetGateway, SettingsGateway, TenantScoped,
};

type Seeder<T> = fn(Uuid, DateTime<Utc>) -> Vec<T>;

/// Entities that carry a tenant reference.
trait TenantOwned {
    fn owner_tenant(&self) -> Uuid;
}

impl TenantOwned for Client {
    fn owner_tenant(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantOwned for Pet {
    fn owner_tenant(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantOwned for Appointment {
    fn owner_tenant(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantOwned for MedicalRecord {
    fn owner_tenant(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Clone)]
pub struct LocalGateway {
    store: Arc<dyn SnapshotStore>,
    tenant_id: Uuid,
}

impl LocalGateway {
    pub fn new(store: Arc<dyn SnapshotStore>, tenant_id: Uuid) -> Self {
        Self { store, tenant_id }
    }

    /// Load a collection. An absent or unreadable snapshot is replaced by the seed data,
    /// which is persisted right away so later loads are stable.
    async fn load<T>(&self, entity: SnapshotEntity, seeder: Seeder<T>) -> Result<Vec<T>, AppError>
    where
        T: Serialize + DeserializeOwned + TenantOwned + Send + Sync,
    {
        let key = snapshot_key(entity, self.tenant_id);

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(mut items) => {
                    items.retain(|item| item.owner_tenant() == self.tenant_id);
                    return Ok(items);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Malformed snapshot, seeding demo data")
                }
            },
            Ok(None) => tracing::info!(key = %key, "No snapshot found, seeding demo data"),
            Err(StorageError::Malformed(reason)) => {
                tracing::warn!(key = %key, error = %reason, "Malformed snapshot, seeding demo data")
            }
            Err(e) => return Err(e.into()),
        }

        let items = seeder(self.tenant_id, Utc::now());
        self.save(entity, &items).await?;
        Ok(items)
    }

    async fn save<T>(&self, entity: SnapshotEntity, items: &[T]) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        let key = snapshot_key(entity, self.tenant_id);
        let raw = serde_json::to_string(items)?;
        self.store.put(&key, raw).await?;
        Ok(())
    }

    async fn clients(&self) -> Result<Vec<Client>, AppError> {
        self.load(SnapshotEntity::Clients, seed::clients).await
    }

    async fn pets(&self) -> Result<Vec<Pet>, AppError> {
        self.load(SnapshotEntity::Pets, seed::pets).await
    }

    async fn appointments(&self) -> Result<Vec<Appointment>, AppError> {
        self.load(SnapshotEntity::Appointments, seed::appointments)
            .await
    }

    async fn records(&self) -> Result<Vec<MedicalRecord>, AppError> {
        self.load(SnapshotEntity::Records, seed::records).await
    }

    async fn pets_with_owner(&self) -> Result<Vec<PetWithOwner>, AppError> {
        let clients = self.clients().await?;
        let pets = self.pets().await?;
        Ok(pets
            .into_iter()
            .map(|pet| {
                let owner = clients
                    .iter()
                    .find(|c| c.id == pet.client_id)
                    .map(Client::summary);
                PetWithOwner { pet, owner }
            })
            .collect())
    }

    /// Appointments joined with pet and client, ascending by date-time.
    async fn appointments_with_details(&self) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let clients = self.clients().await?;
        let pets = self.pets().await?;
        let mut appointments = self.appointments().await?;
        appointments.sort_by_key(|a| a.date_time);

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentWithDetails {
                pet: pets
                    .iter()
                    .find(|p| p.id == appointment.pet_id)
                    .map(Pet::summary),
                client: clients
                    .iter()
                    .find(|c| c.id == appointment.client_id)
                    .map(Client::summary),
                appointment,
            })
            .collect())
    }

    async fn ensure_owner(&self, client_id: Uuid) -> Result<(), AppError> {
        if self.clients().await?.iter().any(|c| c.id == client_id) {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Owner {} does not exist in this clinic",
                client_id
            )))
        }
    }

    async fn ensure_pet_of_client(&self, pet_id: Uuid, client_id: Uuid) -> Result<(), AppError> {
        match self.pets().await?.iter().find(|p| p.id == pet_id) {
            None => Err(AppError::validation(format!(
                "Pet {} does not exist in this clinic",
                pet_id
            ))),
            Some(pet) if pet.client_id != client_id => Err(AppError::validation(format!(
                "Pet {} does not belong to client {}",
                pet_id, client_id
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Remove appointments and records attached to any of `pet_ids`.
    async fn cascade_pets(&self, pet_ids: &[Uuid], client_id: Option<Uuid>) -> Result<(), AppError> {
        let mut appointments = self.appointments().await?;
        let appointments_before = appointments.len();
        appointments.retain(|a| {
            !pet_ids.contains(&a.pet_id) && client_id.map_or(true, |c| a.client_id != c)
        });
        let appointments_removed = appointments_before - appointments.len();
        if appointments_removed > 0 {
            self.save(SnapshotEntity::Appointments, &appointments).await?;
        }

        let mut records = self.records().await?;
        let records_before = records.len();
        records.retain(|r| !pet_ids.contains(&r.pet_id));
        let records_removed = records_before - records.len();
        if records_removed > 0 {
            self.save(SnapshotEntity::Records, &records).await?;
        }

        tracing::debug!(
            tenant_id = %self.tenant_id,
            pets = pet_ids.len(),
            appointments_removed,
            records_removed,
            "Cascaded demo delete"
        );
        Ok(())
    }
}

impl TenantScoped for LocalGateway {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    fn mode(&self) -> GatewayMode {
        GatewayMode::Local
    }
}

#[async_trait]
impl ClientGateway for LocalGateway {
    async fn list_clients(&self) -> Result<Vec<ClientWithStats>, AppError> {
        let pets = self.pets().await?;
        let mut clients = self.clients().await?;
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(clients
            .into_iter()
            .map(|client| {
                let pet_count = pets.iter().filter(|p| p.client_id == client.id).count() as i64;
                ClientWithStats { client, pet_count }
            })
            .collect())
    }

    async fn list_clients_by_name(&self) -> Result<Vec<Client>, AppError> {
        let mut clients = self.clients().await?;
        clients.sort_by_key(|c| (c.first_name.to_lowercase(), c.last_name.to_lowercase()));
        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        Ok(self.clients().await?.into_iter().find(|c| c.id == id))
    }

    async fn create_client(&self, input: ClientInput) -> Result<Client, AppError> {
        let mut clients = self.clients().await?;
        let client = Client::new(self.tenant_id, input);
        clients.insert(0, client.clone());
        self.save(SnapshotEntity::Clients, &clients).await?;
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, input: ClientInput) -> Result<Client, AppError> {
        let mut clients = self.clients().await?;
        let client = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Client", id))?;
        client.apply(input);
        let updated = client.clone();
        self.save(SnapshotEntity::Clients, &clients).await?;
        Ok(updated)
    }

    async fn delete_client(&self, id: Uuid) -> Result<bool, AppError> {
        let mut clients = self.clients().await?;
        let before = clients.len();
        clients.retain(|c| c.id != id);
        if clients.len() == before {
            return Ok(false);
        }
        self.save(SnapshotEntity::Clients, &clients).await?;

        let mut pets = self.pets().await?;
        let owned: Vec<Uuid> = pets
            .iter()
            .filter(|p| p.client_id == id)
            .map(|p| p.id)
            .collect();
        if !owned.is_empty() {
            pets.retain(|p| p.client_id != id);
            self.save(SnapshotEntity::Pets, &pets).await?;
        }
        self.cascade_pets(&owned, Some(id)).await?;
        Ok(true)
    }
}

#[async_trait]
impl PetGateway for LocalGateway {
    async fn list_pets(&self) -> Result<Vec<PetWithOwner>, AppError> {
        let mut pets = self.pets_with_owner().await?;
        pets.sort_by(|a, b| b.pet.created_at.cmp(&a.pet.created_at));
        Ok(pets)
    }

    async fn list_pets_by_name(&self) -> Result<Vec<PetWithOwner>, AppError> {
        let mut pets = self.pets_with_owner().await?;
        pets.sort_by_key(|p| p.pet.name.to_lowercase());
        Ok(pets)
    }

    async fn list_pets_for_client(&self, client_id: Uuid) -> Result<Vec<Pet>, AppError> {
        let mut pets: Vec<Pet> = self
            .pets()
            .await?
            .into_iter()
            .filter(|p| p.client_id == client_id)
            .collect();
        pets.sort_by_key(|p| p.name.to_lowercase());
        Ok(pets)
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, AppError> {
        Ok(self.pets().await?.into_iter().find(|p| p.id == id))
    }

    async fn create_pet(&self, input: PetInput) -> Result<Pet, AppError> {
        self.ensure_owner(input.client_id).await?;
        let mut pets = self.pets().await?;
        let pet = Pet::new(self.tenant_id, input);
        pets.insert(0, pet.clone());
        self.save(SnapshotEntity::Pets, &pets).await?;
        Ok(pet)
    }

    async fn update_pet(&self, id: Uuid, input: PetInput) -> Result<Pet, AppError> {
        self.ensure_owner(input.client_id).await?;
        let mut pets = self.pets().await?;
        let pet = pets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Pet", id))?;
        pet.apply(input);
        let updated = pet.clone();
        self.save(SnapshotEntity::Pets, &pets).await?;
        Ok(updated)
    }

    async fn delete_pet(&self, id: Uuid) -> Result<bool, AppError> {
        let mut pets = self.pets().await?;
        let before = pets.len();
        pets.retain(|p| p.id != id);
        if pets.len() == before {
            return Ok(false);
        }
        self.save(SnapshotEntity::Pets, &pets).await?;
        self.cascade_pets(&[id], None).await?;
        Ok(true)
    }
}

#[async_trait]
impl AppointmentGateway for LocalGateway {
    async fn list_appointments(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let mut appointments = self.appointments_with_details().await?;
        appointments.retain(|a| filter.matches(a.appointment.status));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<AppointmentWithDetails>, AppError> {
        Ok(self
            .appointments_with_details()
            .await?
            .into_iter()
            .find(|a| a.appointment.id == id))
    }

    async fn create_appointment(&self, input: AppointmentInput) -> Result<Appointment, AppError> {
        self.ensure_pet_of_client(input.pet_id, input.client_id)
            .await?;
        let mut appointments = self.appointments().await?;
        let appointment = Appointment::new(self.tenant_id, input);
        appointments.push(appointment.clone());
        appointments.sort_by_key(|a| a.date_time);
        self.save(SnapshotEntity::Appointments, &appointments)
            .await?;
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        input: AppointmentInput,
    ) -> Result<Appointment, AppError> {
        self.ensure_pet_of_client(input.pet_id, input.client_id)
            .await?;
        let mut appointments = self.appointments().await?;
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("Appointment", id))?;
        appointment.apply(input);
        let updated = appointment.clone();
        appointments.sort_by_key(|a| a.date_time);
        self.save(SnapshotEntity::Appointments, &appointments)
            .await?;
        Ok(updated)
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let mut appointments = self.appointments().await?;
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("Appointment", id))?;
        appointment.status = status;
        let updated = appointment.clone();
        self.save(SnapshotEntity::Appointments, &appointments)
            .await?;
        Ok(updated)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, AppError> {
        let mut appointments = self.appointments().await?;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        if appointments.len() == before {
            return Ok(false);
        }
        self.save(SnapshotEntity::Appointments, &appointments)
            .await?;
        Ok(true)
    }
}

#[async_trait]
impl MedicalRecordGateway for LocalGateway {
    async fn list_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, AppError> {
        let mut records: Vec<MedicalRecord> = self
            .records()
            .await?
            .into_iter()
            .filter(|r| r.pet_id == pet_id)
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, AppError> {
        Ok(self.records().await?.into_iter().find(|r| r.id == id))
    }

    async fn create_record(&self, input: MedicalRecordInput) -> Result<MedicalRecord, AppError> {
        if !self.pets().await?.iter().any(|p| p.id == input.pet_id) {
            return Err(AppError::validation(format!(
                "Pet {} does not exist in this clinic",
                input.pet_id
            )));
        }
        let mut records = self.records().await?;
        let record = MedicalRecord::new(self.tenant_id, input);
        records.insert(0, record.clone());
        self.save(SnapshotEntity::Records, &records).await?;
        Ok(record)
    }

    async fn update_record(
        &self,
        id: Uuid,
        input: MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        let mut records = self.records().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id && r.pet_id == input.pet_id)
            .ok_or_else(|| AppError::not_found("Medical record", id))?;
        record.apply(input);
        let updated = record.clone();
        self.save(SnapshotEntity::Records, &records).await?;
        Ok(updated)
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(SnapshotEntity::Records, &records).await?;
        Ok(true)
    }
}

#[async_trait]
impl SettingsGateway for LocalGateway {
    async fn load_tenant(&self, fallback: &Tenant) -> Result<Tenant, AppError> {
        let key = snapshot_key(SnapshotEntity::Tenant, self.tenant_id);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(fallback.clone()),
            Err(StorageError::Malformed(reason)) => {
                tracing::warn!(key = %key, error = %reason, "Malformed tenant snapshot, ignoring it");
                return Ok(fallback.clone());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Tenant>(&raw) {
            Ok(tenant) if tenant.id == self.tenant_id => Ok(tenant),
            Ok(_) => {
                tracing::warn!(key = %key, "Stored tenant belongs to another clinic, ignoring it");
                Ok(fallback.clone())
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Malformed tenant snapshot, ignoring it");
                Ok(fallback.clone())
            }
        }
    }

    async fn update_tenant_settings(
        &self,
        current: &Tenant,
        update: &TenantSettingsUpdate,
    ) -> Result<Tenant, AppError> {
        let mut tenant = self.load_tenant(current).await?;
        tenant.apply_settings(update);

        let key = snapshot_key(SnapshotEntity::Tenant, self.tenant_id);
        self.store.put(&key, serde_json::to_string(&tenant)?).await?;
        tracing::info!(tenant_id = %self.tenant_id, "Saved demo clinic settings");
        Ok(tenant)
    }
}

#[async_trait]
impl DashboardGateway for LocalGateway {
    async fn count_pets(&self) -> Result<i64, AppError> {
        Ok(self.pets().await?.len() as i64)
    }

    async fn count_appointments_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        Ok(self
            .appointments()
            .await?
            .iter()
            .filter(|a| a.date_time >= start && a.date_time < end)
            .count() as i64)
    }

    async fn count_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<i64, AppError> {
        Ok(self
            .appointments()
            .await?
            .iter()
            .filter(|a| a.status == status)
            .count() as i64)
    }

    async fn list_upcoming(
        &self,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        Ok(self
            .appointments_with_details()
            .await?
            .into_iter()
            .filter(|a| a.appointment.date_time >= from)
            .take(limit)
            .collect())
    }
}
