use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use contentai_core::{AppError, AppResult};

use super::config::RateLimitRule;
use super::ports::RateLimitRepository;

/// Bucket shared by every caller whose address could not be determined.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Checks whether the given client is within the rate limit.
    ///
    /// Records the attempt and returns `Ok(())` if allowed, or
    /// `Err(AppError::RateLimited)` if the limit has been exceeded.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, client_key: &str) -> AppResult<()> {
        self.check_rate_limit_at(rule, client_key, Utc::now()).await
    }

    /// Same as [`Self::check_rate_limit`] with an explicit clock.
    ///
    /// A blank client key is folded into [`UNKNOWN_CLIENT_KEY`] so that callers
    /// without an address are throttled together instead of bypassing the limit.
    pub async fn check_rate_limit_at(
        &self,
        rule: &RateLimitRule,
        client_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        // One bucket per client: every throttled route draws on it.
        let client_key = normalize_client_key(client_key);
        let info = self
            .repository
            .record_attempt(client_key, rule.window_seconds, now)
            .await?;

        // Rejected attempts never move the window start, so counting them
        // does not change any later decision within the window.
        if info.attempt_count > rule.max_attempts {
            warn!(
                key = client_key,
                attempts = info.attempt_count,
                limit = rule.max_attempts,
                "rate limit exceeded"
            );
            return Err(AppError::RateLimited);
        }

        Ok(())
    }
}

fn normalize_client_key(client_key: &str) -> &str {
    let trimmed = client_key.trim();
    if trimmed.is_empty() {
        UNKNOWN_CLIENT_KEY
    } else {
        trimmed
    }
}
