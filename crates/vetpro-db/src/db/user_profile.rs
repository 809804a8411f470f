use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vetpro_core::models::UserProfile;
use vetpro_core::AppError;

#[derive(Clone)]
pub struct UserProfileRepository {
    pool: PgPool,
}

impl UserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Profile of an authenticated user, keyed by the auth user id.
    #[tracing::instrument(skip(self), fields(db.table = "user_profiles", db.operation = "select"))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        sqlx::query_as::<Postgres, UserProfile>(
            r#"
            SELECT id, tenant_id, email, name, role, avatar_url
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to fetch user profile");
            AppError::from(e)
        })
    }

    /// Create the profile row for a freshly signed-up user, without a clinic.
    #[tracing::instrument(skip(self), fields(db.table = "user_profiles", db.operation = "insert"))]
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<Postgres, UserProfile>(
            r#"
            INSERT INTO user_profiles (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, tenant_id, email, name, role, avatar_url
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user_id, "Created user profile");
        Ok(profile)
    }
}
