//! In-memory post repository used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use contentai_application::PostRepository;
use contentai_core::AppResult;
use contentai_domain::{PostId, PostQuery, StoredPost};

/// In-memory post store keyed by post id.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<PostId, StoredPost>>,
}

impl InMemoryPostRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &StoredPost) -> AppResult<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_subject: &str,
        query: &PostQuery,
    ) -> AppResult<(Vec<StoredPost>, u64)> {
        let posts = self.posts.read().await;
        let mut matching = posts
            .values()
            .filter(|post| post.owner_subject == owner_subject && query.matches(post))
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.as_uuid().cmp(&left.id.as_uuid()))
        });

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok((page, total))
    }

    async fn delete_for_owner(&self, owner_subject: &str, post_id: PostId) -> AppResult<bool> {
        let mut posts = self.posts.write().await;
        let owned = posts
            .get(&post_id)
            .is_some_and(|post| post.owner_subject == owner_subject);
        if owned {
            posts.remove(&post_id);
        }

        Ok(owned)
    }
}
