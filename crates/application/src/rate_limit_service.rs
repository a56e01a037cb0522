//! Rate limiting ports and application service.
//!
//! Implements a fixed-window-per-key limiter: each client key gets
//! `max_attempts` requests per window, and a key's window restarts on its
//! first request after the previous window elapsed. State lives in a
//! [`RateLimitRepository`]; the shipped implementation is process-local, so
//! the limit is enforced per running instance, not globally.

mod config;
mod ports;
mod service;


pub use config::RateLimitRule;
pub use ports::{AttemptInfo, RateLimitRepository};
pub use service::{RateLimitService, UNKNOWN_CLIENT_KEY};
