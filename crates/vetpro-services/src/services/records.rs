use uuid::Uuid;
use vetpro_core::models::{MedicalRecord, MedicalRecordForm, PetWithOwner};
use vetpro_core::{AppError, FormInput};
use vetpro_gateway::{MedicalRecordGateway, PetGateway};

use super::logged;
use crate::confirm::{Confirmation, DeleteOutcome};
use crate::context::TenantContext;

#[derive(Clone)]
pub struct MedicalRecordService {
    ctx: TenantContext,
}

impl MedicalRecordService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Pets ordered by name for choosing whose history to open.
    pub async fn pet_picker(&self, search: Option<&str>) -> Result<Vec<PetWithOwner>, AppError> {
        let mut pets = logged("list pets", self.ctx.gateway().list_pets_by_name().await)?;
        if let Some(term) = search {
            pets.retain(|p| p.matches_search(term));
        }
        Ok(pets)
    }

    /// Records of one pet, newest first.
    pub async fn history(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, AppError> {
        logged(
            "list medical records",
            self.ctx.gateway().list_records_for_pet(pet_id).await,
        )
    }

    pub async fn get(&self, id: Uuid) -> Result<MedicalRecord, AppError> {
        logged("get medical record", self.ctx.gateway().get_record(id).await)?
            .ok_or_else(|| AppError::not_found("Medical record", id))
    }

    pub async fn create(&self, form: MedicalRecordForm) -> Result<MedicalRecord, AppError> {
        let input = form.into_input()?;
        let record = logged(
            "create medical record",
            self.ctx.gateway().create_record(input).await,
        )?;
        tracing::info!(pet_id = %record.pet_id, record_id = %record.id, "Medical record created");
        Ok(record)
    }

    pub async fn update(&self, id: Uuid, form: MedicalRecordForm) -> Result<MedicalRecord, AppError> {
        let input = form.into_input()?;
        logged(
            "update medical record",
            self.ctx.gateway().update_record(id, input).await,
        )
    }

    pub async fn delete(
        &self,
        id: Uuid,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        let Some(record) = logged("get medical record", self.ctx.gateway().get_record(id).await)?
        else {
            return Ok(DeleteOutcome::NotFound);
        };

        let prompt = format!("Delete the record \"{}\"?", record.diagnosis);
        if !confirmation.confirm(&prompt) {
            return Ok(DeleteOutcome::Declined);
        }

        let deleted = logged(
            "delete medical record",
            self.ctx.gateway().delete_record(id).await,
        )?;
        Ok(if deleted {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{demo_context, yes};

    fn form(pet_id: Uuid, diagnosis: &str) -> MedicalRecordForm {
        MedicalRecordForm {
            pet_id: Some(pet_id),
            diagnosis: diagnosis.to_string(),
            treatment: "Reposo".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_picker_sorted_and_searchable() {
        let service = MedicalRecordService::new(demo_context());
        let pets = service.pet_picker(None).await.unwrap();
        let names: Vec<_> = pets.iter().map(|p| p.pet.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        let found = service.pet_picker(Some("castro")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pet.name, "Nala");
    }

    #[tokio::test]
    async fn test_new_record_heads_history() {
        let service = MedicalRecordService::new(demo_context());
        let pet_id = service.pet_picker(None).await.unwrap()[0].pet.id;

        let record = service.create(form(pet_id, "Gastritis")).await.unwrap();
        let history = service.history(pet_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, record.id);

        let edited = service
            .update(record.id, form(pet_id, "Gastritis leve"))
            .await
            .unwrap();
        assert_eq!(edited.date, record.date);

        assert_eq!(
            service.delete(record.id, &yes).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(service.history(pet_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_diagnosis_required() {
        let service = MedicalRecordService::new(demo_context());
        let pet_id = service.pet_picker(None).await.unwrap()[0].pet.id;
        let err = service.create(form(pet_id, "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.history(pet_id).await.unwrap().len(), 1);
    }
}
