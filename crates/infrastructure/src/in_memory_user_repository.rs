//! In-memory user repository used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use contentai_application::UserRepository;
use contentai_core::AppResult;
use contentai_domain::{IdentityClaims, LocalUser, UserId};

/// In-memory user store keyed by local id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, LocalUser>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_provider_subject(
        &self,
        provider_subject: &str,
    ) -> AppResult<Option<LocalUser>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.provider_subject == provider_subject)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<LocalUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn create(&self, claims: &IdentityClaims) -> AppResult<LocalUser> {
        let mut users = self.users.write().await;

        // Re-check under the write lock so racing first logins share one record.
        if let Some(existing) = users
            .values()
            .find(|user| user.provider_subject == claims.provider_subject())
        {
            return Ok(existing.clone());
        }

        let user = LocalUser::from_claims(claims);
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use contentai_application::UserRepository;
    use contentai_domain::IdentityClaims;

    use super::InMemoryUserRepository;

    fn claims(subject: &str) -> IdentityClaims {
        match IdentityClaims::new(subject, "lee@example.com", None, None) {
            Ok(claims) => claims,
            Err(error) => panic!("claims should be valid: {error}"),
        }
    }

    #[tokio::test]
    async fn create_is_idempotent_per_provider_subject() {
        let repository = InMemoryUserRepository::new();

        let first = repository.create(&claims("google-7")).await;
        let second = repository.create(&claims("google-7")).await;
        let other = repository.create(&claims("google-8")).await;

        let (Ok(first), Ok(second), Ok(other)) = (first, second, other) else {
            panic!("creates should succeed");
        };
        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
        assert_eq!(first.name, "lee");
    }

    #[tokio::test]
    async fn lookups_find_created_users() {
        let repository = InMemoryUserRepository::new();
        let Ok(created) = repository.create(&claims("google-9")).await else {
            panic!("create should succeed");
        };

        let by_id = repository.find_by_id(created.id).await;
        let by_subject = repository.find_by_provider_subject("google-9").await;
        let missing = repository.find_by_provider_subject("google-10").await;

        assert_eq!(by_id.ok().flatten(), Some(created.clone()));
        assert_eq!(by_subject.ok().flatten(), Some(created));
        assert!(matches!(missing, Ok(None)));
    }

    #[tokio::test]
    async fn concurrent_first_logins_share_one_record() {
        let repository = Arc::new(InMemoryUserRepository::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repository = repository.clone();
            handles.push(tokio::spawn(async move {
                repository.create(&claims("google-race")).await.ok().map(|user| user.id)
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.ok().flatten());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].is_some());
    }
}
