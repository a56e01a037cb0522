//! Stateless session tokens.
//!
//! A session token is a signed, self-contained `{sub, iat, exp}` payload.
//! Validity is a function of signature and expiry alone: nothing is stored
//! server-side and tokens cannot be revoked before they expire.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use contentai_core::{AppError, AppResult};

mod bearer;


pub use bearer::bearer_token_from_header;

/// Default validity horizon for newly issued session tokens.
pub const DEFAULT_SESSION_VALIDITY_DAYS: i64 = 30;

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Local user identifier. Missing subjects decode as empty and are
    /// rejected by [`SessionTokenService::verify`].
    #[serde(default)]
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Port for signing and verifying session token payloads.
///
/// Implementations bind their secret and algorithm at construction and must
/// reject a bad configuration there, not on first use.
pub trait SessionTokenCodec: Send + Sync {
    /// Signs the claims into a compact token string.
    fn encode(&self, claims: &SessionClaims) -> AppResult<String>;

    /// Verifies signature and expiry and returns the claims.
    fn decode(&self, token: &str) -> AppResult<SessionClaims>;
}

/// Application service issuing and verifying session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    codec: Arc<dyn SessionTokenCodec>,
    validity: Duration,
}

impl SessionTokenService {
    /// Creates a service issuing tokens valid for `validity_days`.
    ///
    /// Zero or negative values are accepted and produce tokens that are
    /// already expired when issued.
    #[must_use]
    pub fn new(codec: Arc<dyn SessionTokenCodec>, validity_days: i64) -> Self {
        Self {
            codec,
            validity: Duration::days(validity_days),
        }
    }

    /// Issues a token for `subject` expiring after the configured horizon.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// Any non-empty subject is signed verbatim.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> AppResult<String> {
        if subject.is_empty() {
            return Err(AppError::Validation(
                "session subject must not be empty".to_owned(),
            ));
        }

        let claims = SessionClaims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        self.codec.encode(&claims)
    }

    /// Verifies a token and returns its subject.
    ///
    /// Every failure mode (bad signature, malformed token, expiry, missing
    /// subject) yields the same [`AppError::InvalidToken`].
    pub fn verify(&self, token: &str) -> AppResult<String> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<String> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AppError::InvalidToken)?;

        if now.timestamp() >= claims.exp || claims.sub.is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims.sub)
    }

    /// Extracts the bearer token from an `Authorization` header value and
    /// verifies it.
    pub fn verify_header(&self, header_value: Option<&str>) -> AppResult<String> {
        let token = bearer_token_from_header(header_value)?;
        self.verify(token)
    }
}
