//! Third-party identity bridging.
//!
//! Turns a verified identity-provider assertion into a local user and a
//! session token. Provider failures are never distinguished to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use contentai_core::{AppError, AppResult};
use contentai_domain::{IdentityClaims, LocalUser, UserId};

use crate::SessionTokenService;


/// Default upper bound for one identity-provider verification.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Port for verifying identity tokens issued by an external provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies signature, audience, issuer, and expiry of `raw_token`.
    async fn verify(&self, raw_token: &str, expected_audience: &str)
    -> AppResult<IdentityClaims>;
}

/// Repository port for local users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by the identity provider's subject id.
    async fn find_by_provider_subject(&self, provider_subject: &str)
    -> AppResult<Option<LocalUser>>;

    /// Finds a user by local identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<LocalUser>>;

    /// Creates a user from verified claims and returns the stored record.
    async fn create(&self, claims: &IdentityClaims) -> AppResult<LocalUser>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Freshly issued session token.
    pub token: String,
    /// The local user the token was issued for.
    pub user: LocalUser,
}

/// Application service for identity-provider login.
#[derive(Clone)]
pub struct IdentityService {
    identity_provider: Arc<dyn IdentityProvider>,
    user_repository: Arc<dyn UserRepository>,
    session_token_service: SessionTokenService,
    expected_audience: String,
    verification_timeout: Duration,
}

impl IdentityService {
    /// Creates a new identity service.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        user_repository: Arc<dyn UserRepository>,
        session_token_service: SessionTokenService,
        expected_audience: impl Into<String>,
    ) -> Self {
        Self {
            identity_provider,
            user_repository,
            session_token_service,
            expected_audience: expected_audience.into(),
            verification_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Overrides the verification timeout.
    #[must_use]
    pub fn with_verification_timeout(mut self, verification_timeout: Duration) -> Self {
        self.verification_timeout = verification_timeout;
        self
    }

    /// Verifies an external identity token against the configured audience.
    ///
    /// Any failure, including timeout or an unreachable key set, yields
    /// [`AppError::InvalidIdentity`]. Nothing is retried here.
    pub async fn verify_external_identity(&self, raw_token: &str) -> AppResult<IdentityClaims> {
        if raw_token.trim().is_empty() {
            return Err(AppError::InvalidIdentity);
        }

        let verification = self
            .identity_provider
            .verify(raw_token, &self.expected_audience);

        match tokio::time::timeout(self.verification_timeout, verification).await {
            Ok(Ok(claims)) => Ok(claims),
            Ok(Err(error)) => {
                warn!(%error, "identity token verification failed");
                Err(AppError::InvalidIdentity)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.verification_timeout.as_millis() as u64,
                    "identity token verification timed out"
                );
                Err(AppError::InvalidIdentity)
            }
        }
    }

    /// Returns the local user linked to `claims`, creating it on first login.
    pub async fn resolve_or_create_local_user(&self, claims: &IdentityClaims) -> AppResult<LocalUser> {
        if let Some(user) = self
            .user_repository
            .find_by_provider_subject(claims.provider_subject())
            .await?
        {
            return Ok(user);
        }

        let user = self.user_repository.create(claims).await?;
        info!(user_id = %user.id, "created local user from identity provider");
        Ok(user)
    }

    /// Verifies the identity token, resolves the local user, and issues a
    /// session token for it.
    pub async fn login(&self, raw_identity_token: &str) -> AppResult<LoginOutcome> {
        let claims = self.verify_external_identity(raw_identity_token).await?;
        let user = self.resolve_or_create_local_user(&claims).await?;
        let token = self.session_token_service.issue(&user.id.to_string())?;

        Ok(LoginOutcome { token, user })
    }

    /// Returns the local user identified by a session subject.
    pub async fn find_user(&self, subject: &str) -> AppResult<LocalUser> {
        let user_id = uuid::Uuid::parse_str(subject)
            .map(UserId::from_uuid)
            .map_err(|_| AppError::NotFound(format!("user '{subject}' not found")))?;

        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{subject}' not found")))
    }
}
