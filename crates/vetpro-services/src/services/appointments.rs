use uuid::Uuid;
use vetpro_core::constants::FALLBACK_PET_NAME;
use vetpro_core::models::{
    Appointment, AppointmentForm, AppointmentInput, AppointmentStatus, AppointmentWithDetails,
    StatusFilter,
};
use vetpro_core::{
    appointment_reminder_message, budget_message, build_whatsapp_link, AppError, FormInput,
};
use vetpro_gateway::{AppointmentGateway, ClientGateway, PetGateway};

use super::logged;
use crate::confirm::{Confirmation, DeleteOutcome};
use crate::context::TenantContext;

#[derive(Clone)]
pub struct AppointmentService {
    ctx: TenantContext,
}

impl AppointmentService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Appointments by date ascending.
    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<AppointmentWithDetails>, AppError> {
        logged(
            "list appointments",
            self.ctx.gateway().list_appointments(filter).await,
        )
    }

    pub async fn get(&self, id: Uuid) -> Result<AppointmentWithDetails, AppError> {
        logged("get appointment", self.ctx.gateway().get_appointment(id).await)?
            .ok_or_else(|| AppError::not_found("Appointment", id))
    }

    /// Date and time in the form are wall-clock values in the clinic's timezone.
    fn schedule(&self, form: AppointmentForm) -> Result<AppointmentInput, AppError> {
        form.into_input()?.scheduled_in(self.ctx.timezone())
    }

    pub async fn create(&self, form: AppointmentForm) -> Result<Appointment, AppError> {
        let input = self.schedule(form)?;
        let appointment = logged(
            "create appointment",
            self.ctx.gateway().create_appointment(input).await,
        )?;
        tracing::info!(
            tenant_id = %self.ctx.tenant().id,
            appointment_id = %appointment.id,
            status = %appointment.status,
            "Appointment created"
        );
        Ok(appointment)
    }

    pub async fn update(&self, id: Uuid, form: AppointmentForm) -> Result<Appointment, AppError> {
        let input = self.schedule(form)?;
        logged(
            "update appointment",
            self.ctx.gateway().update_appointment(id, input).await,
        )
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let appointment = logged(
            "update appointment status",
            self.ctx
                .gateway()
                .update_appointment_status(id, status)
                .await,
        )?;
        tracing::info!(appointment_id = %id, status = %status, "Appointment status changed");
        Ok(appointment)
    }

    pub async fn confirm(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.set_status(id, AppointmentStatus::Confirmed).await
    }

    pub async fn delete(
        &self,
        id: Uuid,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        let Some(details) =
            logged("get appointment", self.ctx.gateway().get_appointment(id).await)?
        else {
            return Ok(DeleteOutcome::NotFound);
        };

        let pet = details
            .pet
            .as_ref()
            .map_or(FALLBACK_PET_NAME, |p| p.name.as_str());
        let prompt = format!("Delete the appointment for {}?", pet);
        if !confirmation.confirm(&prompt) {
            return Ok(DeleteOutcome::Declined);
        }

        let deleted = logged(
            "delete appointment",
            self.ctx.gateway().delete_appointment(id).await,
        )?;
        Ok(if deleted {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }

    /// WhatsApp reminder link for the appointment's client.
    pub async fn reminder_link(&self, id: Uuid) -> Result<String, AppError> {
        let details = self.get(id).await?;
        let phone = details
            .client
            .as_ref()
            .and_then(|c| c.phone.as_deref())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::validation("client has no phone"))?;

        let local = details
            .appointment
            .date_time
            .with_timezone(&self.ctx.timezone());
        let pet = details
            .pet
            .as_ref()
            .map_or(FALLBACK_PET_NAME, |p| p.name.as_str());
        let message = appointment_reminder_message(
            pet,
            &details.appointment.reason,
            &local.format("%d/%m/%Y").to_string(),
            &local.format("%H:%M").to_string(),
            &self.ctx.tenant().name,
        );
        Ok(build_whatsapp_link(phone, &message))
    }

    /// WhatsApp quote link sent to the pet's owner.
    pub async fn budget_link(&self, pet_id: Uuid, total: f64) -> Result<String, AppError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(AppError::validation("Total must be a positive amount"));
        }

        let gateway = self.ctx.gateway();
        let pet = logged("get pet", gateway.get_pet(pet_id).await)?
            .ok_or_else(|| AppError::not_found("Pet", pet_id))?;
        let owner = logged("get client", gateway.get_client(pet.client_id).await)?
            .ok_or_else(|| AppError::not_found("Client", pet.client_id))?;
        let phone = owner
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::validation("client has no phone"))?;

        let tenant = self.ctx.tenant();
        let amount = format!("{} {:.2}", tenant.settings.currency, total);
        Ok(build_whatsapp_link(
            phone,
            &budget_message(&pet.name, &amount, &tenant.name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{demo_context, no, yes};
    use chrono::{NaiveDate, NaiveTime};
    use vetpro_core::models::{ClientForm, ClientInput};

    use crate::services::ClientService;

    #[tokio::test]
    async fn test_pending_filter_case_insensitive() {
        let service = AppointmentService::new(demo_context());
        let filter: StatusFilter = "pending".parse().unwrap();
        let pending = service.list(filter).await.unwrap();
        assert_eq!(pending.len(), 5);
        assert!(pending
            .iter()
            .all(|a| a.appointment.status == AppointmentStatus::Pending));
    }

    #[tokio::test]
    async fn test_confirm_pending_appointment() {
        let service = AppointmentService::new(demo_context());
        let pending = service
            .list(StatusFilter::Only(AppointmentStatus::Pending))
            .await
            .unwrap();
        let id = pending[0].appointment.id;

        service.confirm(id).await.unwrap();
        assert_eq!(
            service.get(id).await.unwrap().appointment.status,
            AppointmentStatus::Confirmed
        );
        assert_eq!(
            service
                .list(StatusFilter::Only(AppointmentStatus::Pending))
                .await
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_create_in_clinic_timezone() {
        let ctx = demo_context();
        let details = AppointmentService::new(ctx.clone())
            .list(StatusFilter::All)
            .await
            .unwrap();
        let pet = details[0].pet.clone().unwrap();
        let client = details[0].client.clone().unwrap();

        let service = AppointmentService::new(ctx);
        let created = service
            .create(AppointmentForm {
                client_id: Some(client.id),
                pet_id: Some(pet.id),
                date: NaiveDate::from_ymd_opt(2030, 5, 2),
                time: NaiveTime::from_hms_opt(10, 15, 0),
                reason: "Control".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        // The demo clinic is in Buenos Aires (UTC-3).
        assert_eq!(created.date_time.to_rfc3339(), "2030-05-02T13:15:00+00:00");
        assert_eq!(created.status, AppointmentStatus::Pending);

        let link = service.reminder_link(created.id).await.unwrap();
        assert!(link.contains("02%2F05%2F2030"));
        assert!(link.contains("10%3A15"));
    }

    #[tokio::test]
    async fn test_reminder_link_for_seeded_appointment() {
        let service = AppointmentService::new(demo_context());
        let first = service.list(StatusFilter::All).await.unwrap()[0].clone();

        let link = service.reminder_link(first.appointment.id).await.unwrap();
        assert!(link.starts_with("https://wa.me/5491155550101?text="));
        assert!(link.contains("Rocco"));
        assert!(link.contains("Veterinaria%20San%20Roque"));
    }

    #[tokio::test]
    async fn test_reminder_requires_client_phone() {
        let ctx = demo_context();
        let service = AppointmentService::new(ctx.clone());
        let first = service.list(StatusFilter::All).await.unwrap()[0].clone();
        let client = first.client.unwrap();

        ClientService::new(ctx)
            .update(
                client.id,
                ClientForm {
                    first_name: client.first_name.clone(),
                    last_name: client.last_name.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service
            .reminder_link(first.appointment.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: client has no phone");
    }

    #[tokio::test]
    async fn test_budget_link_formats_amount() {
        let ctx = demo_context();
        let service = AppointmentService::new(ctx.clone());
        let pet = ctx.gateway().list_pets_by_name().await.unwrap()[0].clone();

        let link = service.budget_link(pet.pet.id, 15000.0).await.unwrap();
        assert!(link.contains("ARS%2015000.00"));
        assert!(link.contains(&pet.pet.name));

        assert!(service.budget_link(pet.pet.id, -1.0).await.is_err());
        let err = service.budget_link(pet.pet.id, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Total must be a positive amount");
    }

    #[tokio::test]
    async fn test_budget_link_rejects_blank_phone() {
        let ctx = demo_context();
        let service = AppointmentService::new(ctx.clone());
        let pet = ctx.gateway().list_pets_by_name().await.unwrap()[0].clone();
        let owner = ctx
            .gateway()
            .get_client(pet.pet.client_id)
            .await
            .unwrap()
            .unwrap();

        ctx.gateway()
            .update_client(
                owner.id,
                ClientInput {
                    first_name: owner.first_name.clone(),
                    last_name: owner.last_name.clone(),
                    email: owner.email.clone(),
                    phone: Some("   ".to_string()),
                    address: owner.address.clone(),
                },
            )
            .await
            .unwrap();

        let err = service.budget_link(pet.pet.id, 100.0).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: client has no phone");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let service = AppointmentService::new(demo_context());
        let id = service.list(StatusFilter::All).await.unwrap()[0].appointment.id;

        assert_eq!(service.delete(id, &no).await.unwrap(), DeleteOutcome::Declined);
        assert_eq!(service.delete(id, &yes).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(service.list(StatusFilter::All).await.unwrap().len(), 9);
    }
}
