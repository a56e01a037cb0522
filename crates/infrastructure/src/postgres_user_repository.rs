//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use contentai_application::UserRepository;
use contentai_core::{AppError, AppResult};
use contentai_domain::{IdentityClaims, LocalUser, UserId};


/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    provider_subject: String,
    email: String,
    name: String,
    picture: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for LocalUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            provider_subject: row.provider_subject,
            email: row.email,
            name: row.name,
            picture: row.picture,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_provider_subject(
        &self,
        provider_subject: &str,
    ) -> AppResult<Option<LocalUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, provider_subject, email, name, picture, created_at
            FROM users
            WHERE provider_subject = $1
            LIMIT 1
            "#,
        )
        .bind(provider_subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user by provider subject: {error}"))
        })?;

        Ok(row.map(LocalUser::from))
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<LocalUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, provider_subject, email, name, picture, created_at
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        Ok(row.map(LocalUser::from))
    }

    async fn create(&self, claims: &IdentityClaims) -> AppResult<LocalUser> {
        let user = LocalUser::from_claims(claims);

        // Concurrent first logins for one subject race on the unique
        // constraint; the loser reads back the winner's row.
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, provider_subject, email, name, picture, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (provider_subject) DO NOTHING
            RETURNING id, provider_subject, email, name, picture, created_at
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.provider_subject.as_str())
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(user.picture.as_deref())
        .bind(user.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create user: {error}")))?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }

        self.find_by_provider_subject(claims.provider_subject())
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "user for provider subject '{}' could not be created",
                    claims.provider_subject()
                ))
            })
    }
}
