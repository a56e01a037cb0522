/// Default number of requests allowed per window.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECONDS: i64 = 60;

/// Request budget shared by every throttled route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: u32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(max_attempts: u32, window_seconds: i64) -> Self {
        Self {
            max_attempts,
            window_seconds,
        }
    }
}

impl Default for RateLimitRule {
    /// 30 requests per 60 seconds.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECONDS)
    }
}
