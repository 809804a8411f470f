use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::{Client, ClientInput, ClientWithStats};
use vetpro_core::AppError;

const CLIENT_COLUMNS: &str =
    "id, tenant_id, first_name, last_name, email, phone, address, created_at";

/// Repository for pet owners
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List clients newest first, each with the number of pets it owns.
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select"))]
    pub async fn list_clients_with_stats(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<ClientWithStats>, AppError> {
        let clients = sqlx::query_as::<Postgres, ClientWithStats>(
            r#"
            SELECT c.id, c.tenant_id, c.first_name, c.last_name, c.email, c.phone, c.address,
                   c.created_at, COUNT(p.id) AS pet_count
            FROM clients c
            LEFT JOIN pets p ON p.client_id = c.id AND p.tenant_id = c.tenant_id
            WHERE c.tenant_id = $1
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// List clients ordered by name, for owner pickers.
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select"))]
    pub async fn list_clients_by_name(&self, tenant_id: Uuid) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<Postgres, Client>(&format!(
            "SELECT {} FROM clients WHERE tenant_id = $1 ORDER BY first_name ASC, last_name ASC",
            CLIENT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Get client by ID (tenant-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select", db.record_id = %id))]
    pub async fn get_client(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            "SELECT {} FROM clients WHERE tenant_id = $1 AND id = $2",
            CLIENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "clients", db.operation = "insert"))]
    pub async fn create_client(
        &self,
        tenant_id: Uuid,
        input: &ClientInput,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            r#"
            INSERT INTO clients (tenant_id, first_name, last_name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "clients", db.operation = "update", db.record_id = %id))]
    pub async fn update_client(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: &ClientInput,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<Postgres, Client>(&format!(
            r#"
            UPDATE clients
            SET first_name = $3, last_name = $4, email = $5, phone = $6, address = $7,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Delete a client. Pets, appointments and medical records go with it through
    /// `ON DELETE CASCADE`.
    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_client(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "clients", db.operation = "select"))]
    pub async fn client_exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
