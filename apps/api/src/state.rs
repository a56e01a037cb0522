use std::sync::Arc;

use contentai_application::{
    GenerationService, IdentityService, PostService, RateLimitRule, RateLimitService,
    SessionTokenService,
};
use ipnet::IpNet;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limit_service: RateLimitService,
    pub rate_limit_rule: RateLimitRule,
    pub session_token_service: SessionTokenService,
    pub identity_service: IdentityService,
    pub generation_service: GenerationService,
    pub post_service: PostService,
    pub trusted_proxies: Arc<[IpNet]>,
}
