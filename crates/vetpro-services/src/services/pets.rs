use uuid::Uuid;
use vetpro_core::models::{Pet, PetForm, PetWithOwner};
use vetpro_core::{AppError, FormInput};
use vetpro_gateway::PetGateway;

use super::logged;
use crate::confirm::{Confirmation, DeleteOutcome};
use crate::context::TenantContext;

#[derive(Clone)]
pub struct PetService {
    ctx: TenantContext,
}

impl PetService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Pets newest first with their owner, narrowed by pet or owner name.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<PetWithOwner>, AppError> {
        let mut pets = logged("list pets", self.ctx.gateway().list_pets().await)?;
        if let Some(term) = search {
            pets.retain(|p| p.matches_search(term));
        }
        Ok(pets)
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Pet>, AppError> {
        logged(
            "list client pets",
            self.ctx.gateway().list_pets_for_client(client_id).await,
        )
    }

    pub async fn get(&self, id: Uuid) -> Result<Pet, AppError> {
        logged("get pet", self.ctx.gateway().get_pet(id).await)?
            .ok_or_else(|| AppError::not_found("Pet", id))
    }

    pub async fn create(&self, form: PetForm) -> Result<Pet, AppError> {
        let input = form.into_input()?;
        let pet = logged("create pet", self.ctx.gateway().create_pet(input).await)?;
        tracing::info!(tenant_id = %self.ctx.tenant().id, pet_id = %pet.id, "Pet created");
        Ok(pet)
    }

    pub async fn update(&self, id: Uuid, form: PetForm) -> Result<Pet, AppError> {
        let input = form.into_input()?;
        logged("update pet", self.ctx.gateway().update_pet(id, input).await)
    }

    pub async fn delete(
        &self,
        id: Uuid,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        let Some(pet) = logged("get pet", self.ctx.gateway().get_pet(id).await)? else {
            return Ok(DeleteOutcome::NotFound);
        };

        let prompt = format!(
            "Delete {}? Its appointments and medical records will be deleted too.",
            pet.name
        );
        if !confirmation.confirm(&prompt) {
            tracing::info!(pet_id = %id, "Pet delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let deleted = logged("delete pet", self.ctx.gateway().delete_pet(id).await)?;
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
    use vetpro_core::models::PetGender;
    use vetpro_gateway::ClientGateway;

    async fn first_client(ctx: &TenantContext) -> Uuid {
        ctx.gateway().list_clients().await.unwrap()[0].client.id
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let ctx = demo_context();
        let owner = first_client(&ctx).await;
        let service = PetService::new(ctx);

        let form = PetForm {
            client_id: Some(owner),
            name: "Pancho".to_string(),
            species: "Gato".to_string(),
            breed: Some("Mestizo".to_string()),
            age: Some("1,5".to_string()),
            weight: Some("4.2".to_string()),
            gender: Some(PetGender::Male),
            photo_url: None,
        };
        let created = service.create(form).await.unwrap();
        let read = service.get(created.id).await.unwrap();
        assert_eq!(read, created);
        assert_eq!(read.client_id, owner);
        assert_eq!(read.age, 1.5);
        assert_eq!(read.weight, 4.2);
        assert_eq!(read.breed.as_deref(), Some("Mestizo"));
    }

    #[tokio::test]
    async fn test_defaults_for_sparse_form() {
        let ctx = demo_context();
        let owner = first_client(&ctx).await;
        let service = PetService::new(ctx);

        let pet = service
            .create(PetForm {
                client_id: Some(owner),
                name: "Firulais".to_string(),
                age: Some("unknown".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pet.species, "Perro");
        assert_eq!(pet.gender, PetGender::Male);
        assert_eq!(pet.age, 0.0);
        assert_eq!(pet.weight, 0.0);
    }

    #[tokio::test]
    async fn test_owner_is_required() {
        let service = PetService::new(demo_context());
        let err = service
            .create(PetForm {
                name: "Sin dueño".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Owner is required"));
    }

    #[tokio::test]
    async fn test_search_matches_owner_name() {
        let service = PetService::new(demo_context());
        let pets = service.list(Some("sánchez")).await.unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].pet.name, "Luna");
    }

    #[tokio::test]
    async fn test_delete_removes_pet() {
        let service = PetService::new(demo_context());
        let id = service.list(None).await.unwrap()[0].pet.id;
        assert_eq!(service.delete(id, &yes).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(service.list(None).await.unwrap().len(), 9);
    }
}
