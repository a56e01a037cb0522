//! User domain types.
//!
//! Local users are only ever created from a verified third-party identity;
//! there are no passwords in this system.

use contentai_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a local user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Claims extracted from a verified third-party identity token.
///
/// Consumed once at login and never stored as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    provider_subject: NonEmptyString,
    email: EmailAddress,
    name: String,
    picture: Option<String>,
}

impl IdentityClaims {
    /// Creates identity claims. A blank display name falls back to the email
    /// local part.
    pub fn new(
        provider_subject: impl Into<String>,
        email: impl Into<String>,
        name: Option<String>,
        picture: Option<String>,
    ) -> AppResult<Self> {
        let provider_subject = NonEmptyString::new(provider_subject)?;
        let email = EmailAddress::new(email)?;
        let name = name
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| email.local_part().to_owned());
        let picture = picture.filter(|value| !value.trim().is_empty());

        Ok(Self {
            provider_subject,
            email,
            name,
            picture,
        })
    }

    /// Returns the provider-scoped stable subject id.
    #[must_use]
    pub fn provider_subject(&self) -> &str {
        self.provider_subject.as_str()
    }

    /// Returns the verified email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the avatar URL, if the provider supplied one.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Durable local user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Local identifier; this is the subject of issued session tokens.
    pub id: UserId,
    /// Identity-provider subject the user was created from.
    pub provider_subject: String,
    /// Email at creation time.
    pub email: String,
    /// Display name at creation time.
    pub name: String,
    /// Avatar URL, if any.
    pub picture: Option<String>,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl LocalUser {
    /// Builds a new, not yet persisted, user from verified claims.
    #[must_use]
    pub fn from_claims(claims: &IdentityClaims) -> Self {
        Self {
            id: UserId::new(),
            provider_subject: claims.provider_subject().to_owned(),
            email: claims.email().as_str().to_owned(),
            name: claims.name().to_owned(),
            picture: claims.picture().map(ToOwned::to_owned),
            created_at: chrono::Utc::now(),
        }
    }
}
