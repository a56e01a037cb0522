//! Post history port and application service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use contentai_core::{AppError, AppResult, Caller};
use contentai_domain::{NewPost, PostId, PostPage, PostQuery, StoredPost};


/// Repository port for stored posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Stores a new post.
    async fn insert(&self, post: &StoredPost) -> AppResult<()>;

    /// Returns the requested page of `owner_subject`'s posts, newest first,
    /// together with the number of posts matching the query overall.
    async fn list_for_owner(
        &self,
        owner_subject: &str,
        query: &PostQuery,
    ) -> AppResult<(Vec<StoredPost>, u64)>;

    /// Deletes a post if `owner_subject` owns it. Returns whether a post was removed.
    async fn delete_for_owner(&self, owner_subject: &str, post_id: PostId) -> AppResult<bool>;
}

/// Application service for a signed-in user's post history.
#[derive(Clone)]
pub struct PostService {
    repository: Arc<dyn PostRepository>,
}

impl PostService {
    /// Creates a new post service.
    #[must_use]
    pub fn new(repository: Arc<dyn PostRepository>) -> Self {
        Self { repository }
    }

    /// Lists the caller's posts.
    pub async fn history(&self, caller: &Caller, query: &PostQuery) -> AppResult<PostPage> {
        let owner = authenticated_subject(caller)?;
        let (posts, total) = self.repository.list_for_owner(owner, query).await?;
        Ok(PostPage::new(posts, total, query))
    }

    /// Saves a post for the caller.
    pub async fn save(&self, caller: &Caller, post: NewPost) -> AppResult<StoredPost> {
        let owner = authenticated_subject(caller)?;
        let stored = post.into_stored(owner, Utc::now());
        self.repository.insert(&stored).await?;

        info!(post_id = %stored.id, subject = owner, "saved post");
        Ok(stored)
    }

    /// Deletes one of the caller's posts.
    ///
    /// Posts owned by someone else are reported as missing.
    pub async fn delete(&self, caller: &Caller, post_id: PostId) -> AppResult<()> {
        let owner = authenticated_subject(caller)?;
        if !self.repository.delete_for_owner(owner, post_id).await? {
            return Err(AppError::NotFound(format!("post '{post_id}' not found")));
        }

        info!(%post_id, subject = owner, "deleted post");
        Ok(())
    }
}

fn authenticated_subject(caller: &Caller) -> AppResult<&str> {
    match caller {
        Caller::Authenticated { subject } => Ok(subject.as_str()),
        Caller::Anonymous => Err(AppError::MissingOrMalformedHeader),
    }
}
