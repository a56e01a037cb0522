use async_trait::async_trait;
use chrono::{DateTime, Utc};

use contentai_core::AppResult;

/// Repository port for rate limit bookkeeping.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key at `now`.
    ///
    /// Implementations first drop every entry whose window has elapsed (a
    /// full scan, O(n) in the number of keys seen during the last window),
    /// then either start a fresh window with a count of one or increment the
    /// live entry. Returns the updated attempt count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
        now: DateTime<Utc>,
    ) -> AppResult<AttemptInfo>;
}

/// Information about the current rate limit window for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// Number of attempts in the current window (including this one).
    pub attempt_count: u32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}
