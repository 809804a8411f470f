use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::{ClientSummary, Pet, PetInput, PetWithOwner};
use vetpro_core::AppError;

const PET_COLUMNS: &str = "id, tenant_id, client_id, name, species, breed, age, weight, gender, \
                           photo_url, created_at";

const PET_WITH_OWNER_SELECT: &str = r#"
    SELECT p.id, p.tenant_id, p.client_id, p.name, p.species, p.breed, p.age, p.weight,
           p.gender, p.photo_url, p.created_at,
           c.first_name AS owner_first_name, c.last_name AS owner_last_name,
           c.phone AS owner_phone
    FROM pets p
    JOIN clients c ON c.id = p.client_id AND c.tenant_id = p.tenant_id
    WHERE p.tenant_id = $1
"#;

#[derive(sqlx::FromRow)]
struct PetWithOwnerRow {
    #[sqlx(flatten)]
    pet: Pet,
    owner_first_name: String,
    owner_last_name: String,
    owner_phone: Option<String>,
}

impl From<PetWithOwnerRow> for PetWithOwner {
    fn from(row: PetWithOwnerRow) -> Self {
        let owner = ClientSummary {
            id: row.pet.client_id,
            first_name: row.owner_first_name,
            last_name: row.owner_last_name,
            phone: row.owner_phone,
        };
        PetWithOwner {
            pet: row.pet,
            owner: Some(owner),
        }
    }
}

/// Repository for patients
#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List pets newest first, joined with their owner.
    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "select"))]
    pub async fn list_pets_with_owner(&self, tenant_id: Uuid) -> Result<Vec<PetWithOwner>, AppError> {
        let rows = sqlx::query_as::<Postgres, PetWithOwnerRow>(&format!(
            "{} ORDER BY p.created_at DESC",
            PET_WITH_OWNER_SELECT
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PetWithOwner::from).collect())
    }

    /// List pets ordered by name, joined with their owner.
    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "select"))]
    pub async fn list_pets_by_name(&self, tenant_id: Uuid) -> Result<Vec<PetWithOwner>, AppError> {
        let rows = sqlx::query_as::<Postgres, PetWithOwnerRow>(&format!(
            "{} ORDER BY p.name ASC",
            PET_WITH_OWNER_SELECT
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PetWithOwner::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "select"))]
    pub async fn list_pets_for_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Vec<Pet>, AppError> {
        let pets = sqlx::query_as::<Postgres, Pet>(&format!(
            "SELECT {} FROM pets WHERE tenant_id = $1 AND client_id = $2 ORDER BY name ASC",
            PET_COLUMNS
        ))
        .bind(tenant_id)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pets)
    }

    /// Get pet by ID (tenant-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "select", db.record_id = %id))]
    pub async fn get_pet(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<Postgres, Pet>(&format!(
            "SELECT {} FROM pets WHERE tenant_id = $1 AND id = $2",
            PET_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pet)
    }

    /// Create a pet. The owner must belong to the same tenant.
    #[tracing::instrument(skip(self, input), fields(db.table = "pets", db.operation = "insert"))]
    pub async fn create_pet(&self, tenant_id: Uuid, input: &PetInput) -> Result<Pet, AppError> {
        self.ensure_owner(tenant_id, input.client_id).await?;

        let pet = sqlx::query_as::<Postgres, Pet>(&format!(
            r#"
            INSERT INTO pets (tenant_id, client_id, name, species, breed, age, weight, gender, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PET_COLUMNS
        ))
        .bind(tenant_id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.species)
        .bind(&input.breed)
        .bind(input.age)
        .bind(input.weight)
        .bind(input.gender)
        .bind(&input.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(pet)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "pets", db.operation = "update", db.record_id = %id))]
    pub async fn update_pet(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: &PetInput,
    ) -> Result<Option<Pet>, AppError> {
        self.ensure_owner(tenant_id, input.client_id).await?;

        let pet = sqlx::query_as::<Postgres, Pet>(&format!(
            r#"
            UPDATE pets
            SET client_id = $3, name = $4, species = $5, breed = $6, age = $7, weight = $8,
                gender = $9, photo_url = $10, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            PET_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.species)
        .bind(&input.breed)
        .bind(input.age)
        .bind(input.weight)
        .bind(input.gender)
        .bind(&input.photo_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pet)
    }

    /// Delete a pet together with its appointments and medical records (`ON DELETE CASCADE`).
    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_pet(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pets WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pets", db.operation = "count"))]
    pub async fn count_pets(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM pets WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn ensure_owner(&self, tenant_id: Uuid, client_id: Uuid) -> Result<(), AppError> {
        let owner_exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(client_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        if !owner_exists {
            return Err(AppError::validation(format!(
                "Owner {} does not exist in this clinic",
                client_id
            )));
        }
        Ok(())
    }
}
