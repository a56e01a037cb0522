//! Process-local rate limit repository.
//!
//! Counters live in a single map owned by this value; nothing is persisted
//! or shared across instances, and everything resets on restart. Behind
//! several replicas each one enforces its own budget, so the effective global
//! limit is `replicas * max_attempts`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use contentai_application::{AttemptInfo, RateLimitRepository};
use contentai_core::{AppError, AppResult};

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_started_at: DateTime<Utc>,
    window: Duration,
}

impl RateLimitEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now - self.window_started_at < self.window
    }
}

/// In-memory implementation of the rate limit repository port.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked keys.
    pub async fn tracked_keys(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
        now: DateTime<Utc>,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(
                "window_duration_seconds must be greater than zero".to_owned(),
            ));
        }
        let window = Duration::seconds(window_duration_seconds);

        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "purged expired rate limit entries");
        }

        // Anything left after the purge is inside its window.
        let entry = entries
            .entry(key.to_owned())
            .and_modify(|entry| entry.count = entry.count.saturating_add(1))
            .or_insert_with(|| RateLimitEntry {
                count: 1,
                window_started_at: now,
                window,
            });

        Ok(AttemptInfo {
            attempt_count: entry.count,
            window_started_at: entry.window_started_at,
        })
    }
}
