use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::{MedicalRecord, MedicalRecordInput};
use vetpro_core::AppError;

const RECORD_COLUMNS: &str = "id, tenant_id, pet_id, veterinarian_id, date, diagnosis, treatment, \
                              symptoms, attachments, created_at";

#[derive(Clone)]
pub struct MedicalRecordRepository {
    pool: PgPool,
}

impl MedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clinical history of one pet, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "medical_records", db.operation = "select"))]
    pub async fn list_records_for_pet(
        &self,
        tenant_id: Uuid,
        pet_id: Uuid,
    ) -> Result<Vec<MedicalRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, MedicalRecord>(&format!(
            "SELECT {} FROM medical_records WHERE tenant_id = $1 AND pet_id = $2 ORDER BY date DESC",
            RECORD_COLUMNS
        ))
        .bind(tenant_id)
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "medical_records", db.operation = "select", db.record_id = %id))]
    pub async fn get_record(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<MedicalRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, MedicalRecord>(&format!(
            "SELECT {} FROM medical_records WHERE tenant_id = $1 AND id = $2",
            RECORD_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "medical_records", db.operation = "insert"))]
    pub async fn create_record(
        &self,
        tenant_id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        let pet_exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM pets WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(input.pet_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        if !pet_exists {
            return Err(AppError::validation(format!(
                "Pet {} does not exist in this clinic",
                input.pet_id
            )));
        }

        let record = sqlx::query_as::<Postgres, MedicalRecord>(&format!(
            r#"
            INSERT INTO medical_records
                (tenant_id, pet_id, veterinarian_id, diagnosis, treatment, symptoms, attachments)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(tenant_id)
        .bind(input.pet_id)
        .bind(input.veterinarian_id)
        .bind(&input.diagnosis)
        .bind(&input.treatment)
        .bind(&input.symptoms)
        .bind(&input.attachments)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Update a record's clinical fields. `date` is never touched.
    #[tracing::instrument(skip(self, input), fields(db.table = "medical_records", db.operation = "update", db.record_id = %id))]
    pub async fn update_record(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<Option<MedicalRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, MedicalRecord>(&format!(
            r#"
            UPDATE medical_records
            SET veterinarian_id = $3, diagnosis = $4, treatment = $5, symptoms = $6,
                attachments = $7, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND pet_id = $8
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(input.veterinarian_id)
        .bind(&input.diagnosis)
        .bind(&input.treatment)
        .bind(&input.symptoms)
        .bind(&input.attachments)
        .bind(input.pet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "medical_records", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_record(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM medical_records WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
