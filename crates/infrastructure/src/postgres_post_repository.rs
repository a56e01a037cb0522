//! PostgreSQL-backed post repository.

use async_trait::async_trait;
use sqlx::PgPool;

use contentai_application::PostRepository;
use contentai_core::{AppError, AppResult};
use contentai_domain::{ContentTemplate, PostId, PostQuery, StoredPost};


/// PostgreSQL implementation of the post repository port.
#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: uuid::Uuid,
    owner_subject: String,
    template: String,
    objective: String,
    context: String,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PostRow> for StoredPost {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let template = row.template.parse::<ContentTemplate>().map_err(|error| {
            AppError::Internal(format!("post '{}' has an unreadable template: {error}", row.id))
        })?;

        Ok(Self {
            id: PostId::from_uuid(row.id),
            owner_subject: row.owner_subject,
            template,
            objective: row.objective,
            context: row.context,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: &StoredPost) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, owner_subject, template, objective, context, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.owner_subject.as_str())
        .bind(post.template.as_str())
        .bind(post.objective.as_str())
        .bind(post.context.as_str())
        .bind(post.content.as_str())
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert post: {error}")))?;

        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_subject: &str,
        query: &PostQuery,
    ) -> AppResult<(Vec<StoredPost>, u64)> {
        // `strpos` keeps the search literal; `%` and `_` in the term are not wildcards.
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE owner_subject = $1
              AND (
                $2::TEXT IS NULL
                OR strpos(lower(objective), lower($2)) > 0
                OR strpos(lower(content), lower($2)) > 0
              )
            "#,
        )
        .bind(owner_subject)
        .bind(query.search())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count posts: {error}")))?;

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, owner_subject, template, objective, context, content, created_at
            FROM posts
            WHERE owner_subject = $1
              AND (
                $2::TEXT IS NULL
                OR strpos(lower(objective), lower($2)) > 0
                OR strpos(lower(content), lower($2)) > 0
              )
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(owner_subject)
        .bind(query.search())
        .bind(i64::from(query.limit()))
        .bind(i64::from(query.skip()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list posts: {error}")))?;

        let posts = rows
            .into_iter()
            .map(StoredPost::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((posts, u64::try_from(total).unwrap_or_default()))
    }

    async fn delete_for_owner(&self, owner_subject: &str, post_id: PostId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND owner_subject = $2")
            .bind(post_id.as_uuid())
            .bind(owner_subject)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete post: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
