//! Shared primitives for all Rust crates in ContentAI.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{ANONYMOUS_SUBJECT, Caller};

/// Result type used across ContentAI crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
///
/// Authentication and throttling variants carry no detail on purpose: callers
/// only learn which category failed, never which sub-check.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller exhausted its request allowance for the current window.
    #[error("too many requests, please try again later")]
    RateLimited,

    /// The `Authorization` header is absent or not of the form `Bearer <token>`.
    #[error("missing or invalid authorization header")]
    MissingOrMalformedHeader,

    /// A session token failed signature, structure, expiry, or subject checks.
    #[error("invalid token")]
    InvalidToken,

    /// A third-party identity assertion could not be verified.
    #[error("invalid identity token")]
    InvalidIdentity,

    /// An upstream service (e.g. the generation backend) failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Startup configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
