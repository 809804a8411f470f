use uuid::Uuid;
use vetpro_core::models::{Client, ClientForm, ClientWithStats, Pet};
use vetpro_core::{AppError, FormInput};
use vetpro_gateway::{ClientGateway, PetGateway};

use super::logged;
use crate::confirm::{Confirmation, DeleteOutcome};
use crate::context::TenantContext;

#[derive(Clone)]
pub struct ClientService {
    ctx: TenantContext,
}

impl ClientService {
    pub fn new(ctx: TenantContext) -> Self {
        Self { ctx }
    }

    /// Clients newest first with their pet counts, narrowed by an optional search term.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<ClientWithStats>, AppError> {
        let mut clients = logged("list clients", self.ctx.gateway().list_clients().await)?;
        if let Some(term) = search {
            clients.retain(|c| c.client.matches_search(term));
        }
        Ok(clients)
    }

    pub async fn get(&self, id: Uuid) -> Result<Client, AppError> {
        logged("get client", self.ctx.gateway().get_client(id).await)?
            .ok_or_else(|| AppError::not_found("Client", id))
    }

    pub async fn pets(&self, client_id: Uuid) -> Result<Vec<Pet>, AppError> {
        logged(
            "list client pets",
            self.ctx.gateway().list_pets_for_client(client_id).await,
        )
    }

    pub async fn create(&self, form: ClientForm) -> Result<Client, AppError> {
        let input = form.into_input()?;
        let client = logged(
            "create client",
            self.ctx.gateway().create_client(input).await,
        )?;
        tracing::info!(tenant_id = %self.ctx.tenant().id, client_id = %client.id, "Client created");
        Ok(client)
    }

    pub async fn update(&self, id: Uuid, form: ClientForm) -> Result<Client, AppError> {
        let input = form.into_input()?;
        logged(
            "update client",
            self.ctx.gateway().update_client(id, input).await,
        )
    }

    pub async fn delete(
        &self,
        id: Uuid,
        confirmation: &dyn Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        let Some(client) = logged("get client", self.ctx.gateway().get_client(id).await)? else {
            return Ok(DeleteOutcome::NotFound);
        };

        let prompt = format!(
            "Delete client {}? Their pets, appointments and medical records will be deleted too.",
            client.full_name()
        );
        if !confirmation.confirm(&prompt) {
            tracing::info!(client_id = %id, "Client delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let deleted = logged("delete client", self.ctx.gateway().delete_client(id).await)?;
        Ok(if deleted {
            tracing::info!(tenant_id = %self.ctx.tenant().id, client_id = %id, "Client deleted");
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{demo_context, no, two_clinics, yes};

    fn form(first: &str, last: &str) -> ClientForm {
        ClientForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: Some("  ".to_string()),
            phone: Some("+54 11 5555-1111".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_search_by_name_email_and_phone() {
        let service = ClientService::new(demo_context());

        let by_name = service.list(Some("juan pé")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].client.first_name, "Juan");

        let by_email = service.list(Some("OUTLOOK")).await.unwrap();
        assert_eq!(by_email[0].client.first_name, "Carlos");

        let by_phone = service.list(Some("5555-0707")).await.unwrap();
        assert_eq!(by_phone[0].client.first_name, "Diego");

        assert_eq!(service.list(None).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_create_stores_blank_optionals_as_absent() {
        let service = ClientService::new(demo_context());
        let client = service.create(form("Ana", "Ibarra")).await.unwrap();
        assert_eq!(client.email, None);
        assert_eq!(service.list(None).await.unwrap()[0].client.id, client.id);
    }

    #[tokio::test]
    async fn test_create_requires_names() {
        let service = ClientService::new(demo_context());
        let err = service.create(form(" ", "Ibarra")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.list(None).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_declined_delete_changes_nothing() {
        let service = ClientService::new(demo_context());
        let id = service.list(None).await.unwrap()[0].client.id;

        assert_eq!(service.delete(id, &no).await.unwrap(), DeleteOutcome::Declined);
        assert!(service.get(id).await.is_ok());

        assert_eq!(service.delete(id, &yes).await.unwrap(), DeleteOutcome::Deleted);
        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
        assert_eq!(service.delete(id, &yes).await.unwrap(), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_delete_prompt_warns_about_cascade() {
        let service = ClientService::new(demo_context());
        let id = service.list(None).await.unwrap()[0].client.id;
        let seen = std::sync::Mutex::new(String::new());
        let capture = |prompt: &str| {
            *seen.lock().unwrap() = prompt.to_string();
            false
        };
        service.delete(id, &capture).await.unwrap();
        let prompt = seen.lock().unwrap().clone();
        assert!(prompt.contains("Juan Pérez"));
        assert!(prompt.contains("pets"));
    }

    #[tokio::test]
    async fn test_other_clinic_cannot_delete() {
        let (clinic, other) = two_clinics();
        let clinic = ClientService::new(clinic);
        let other = ClientService::new(other);
        let created = clinic.create(form("Ana", "Ibarra")).await.unwrap();
        assert_eq!(
            other.delete(created.id, &yes).await.unwrap(),
            DeleteOutcome::NotFound
        );
        assert!(clinic.get(created.id).await.is_ok());
    }
}
