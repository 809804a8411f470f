use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::{
    Appointment, AppointmentInput, AppointmentStatus, AppointmentWithDetails, ClientSummary,
    PetSummary,
};
use vetpro_core::AppError;

const APPOINTMENT_COLUMNS: &str = "id, tenant_id, pet_id, client_id, veterinarian_id, date_time, \
                                   status, reason, notes, created_at";

const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.tenant_id, a.pet_id, a.client_id, a.veterinarian_id, a.date_time,
           a.status, a.reason, a.notes, a.created_at,
           p.name AS pet_name, p.species AS pet_species,
           c.first_name AS client_first_name, c.last_name AS client_last_name,
           c.phone AS client_phone
    FROM appointments a
    LEFT JOIN pets p ON p.id = a.pet_id AND p.tenant_id = a.tenant_id
    LEFT JOIN clients c ON c.id = a.client_id AND c.tenant_id = a.tenant_id
    WHERE a.tenant_id = $1
"#;

#[derive(sqlx::FromRow)]
struct AppointmentDetailsRow {
    #[sqlx(flatten)]
    appointment: Appointment,
    pet_name: Option<String>,
    pet_species: Option<String>,
    client_first_name: Option<String>,
    client_last_name: Option<String>,
    client_phone: Option<String>,
}

impl From<AppointmentDetailsRow> for AppointmentWithDetails {
    fn from(row: AppointmentDetailsRow) -> Self {
        let pet = row.pet_name.map(|name| PetSummary {
            id: row.appointment.pet_id,
            name,
            species: row.pet_species.unwrap_or_default(),
        });
        let client = match (row.client_first_name, row.client_last_name) {
            (Some(first_name), Some(last_name)) => Some(ClientSummary {
                id: row.appointment.client_id,
                first_name,
                last_name,
                phone: row.client_phone,
            }),
            _ => None,
        };
        AppointmentWithDetails {
            appointment: row.appointment,
            pet,
            client,
        }
    }
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List appointments by date ascending, optionally restricted to one status.
    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "select"))]
    pub async fn list_appointments_with_details(
        &self,
        tenant_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let rows = sqlx::query_as::<Postgres, AppointmentDetailsRow>(&format!(
            "{} AND ($2::appt_status IS NULL OR a.status = $2) ORDER BY a.date_time ASC",
            DETAILS_SELECT
        ))
        .bind(tenant_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AppointmentWithDetails::from).collect())
    }

    /// Next appointments from `from` onwards, ascending.
    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "select"))]
    pub async fn list_upcoming(
        &self,
        tenant_id: Uuid,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AppointmentWithDetails>, AppError> {
        let rows = sqlx::query_as::<Postgres, AppointmentDetailsRow>(&format!(
            "{} AND a.date_time >= $2 ORDER BY a.date_time ASC LIMIT $3",
            DETAILS_SELECT
        ))
        .bind(tenant_id)
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AppointmentWithDetails::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "select", db.record_id = %id))]
    pub async fn get_appointment_with_details(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AppointmentWithDetails>, AppError> {
        let row = sqlx::query_as::<Postgres, AppointmentDetailsRow>(&format!(
            "{} AND a.id = $2",
            DETAILS_SELECT
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AppointmentWithDetails::from))
    }

    /// Create an appointment. The pet must belong to the given client within the tenant.
    #[tracing::instrument(skip(self, input), fields(db.table = "appointments", db.operation = "insert"))]
    pub async fn create_appointment(
        &self,
        tenant_id: Uuid,
        input: &AppointmentInput,
    ) -> Result<Appointment, AppError> {
        self.ensure_pet_of_client(tenant_id, input.pet_id, input.client_id)
            .await?;

        let appointment = sqlx::query_as::<Postgres, Appointment>(&format!(
            r#"
            INSERT INTO appointments
                (tenant_id, pet_id, client_id, veterinarian_id, date_time, status, reason, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(input.pet_id)
        .bind(input.client_id)
        .bind(input.veterinarian_id)
        .bind(input.date_time)
        .bind(input.status)
        .bind(&input.reason)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "appointments", db.operation = "update", db.record_id = %id))]
    pub async fn update_appointment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: &AppointmentInput,
    ) -> Result<Option<Appointment>, AppError> {
        self.ensure_pet_of_client(tenant_id, input.pet_id, input.client_id)
            .await?;

        let appointment = sqlx::query_as::<Postgres, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET pet_id = $3, client_id = $4, veterinarian_id = $5, date_time = $6, status = $7,
                reason = $8, notes = $9, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(input.pet_id)
        .bind(input.client_id)
        .bind(input.veterinarian_id)
        .bind(input.date_time)
        .bind(input.status)
        .bind(&input.reason)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "update", db.record_id = %id))]
    pub async fn update_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<Postgres, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_appointment(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count appointments in `[start, end)`.
    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "count"))]
    pub async fn count_between(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM appointments WHERE tenant_id = $1 AND date_time >= $2 AND date_time < $3",
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "appointments", db.operation = "count"))]
    pub async fn count_by_status(
        &self,
        tenant_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM appointments WHERE tenant_id = $1 AND status = $2",
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn ensure_pet_of_client(
        &self,
        tenant_id: Uuid,
        pet_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), AppError> {
        let owner = sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT client_id FROM pets WHERE id = $1 AND tenant_id = $2",
        )
        .bind(pet_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            None => Err(AppError::validation(format!(
                "Pet {} does not exist in this clinic",
                pet_id
            ))),
            Some(owner) if owner != client_id => Err(AppError::validation(format!(
                "Pet {} does not belong to client {}",
                pet_id, client_id
            ))),
            Some(_) => Ok(()),
        }
    }
}
