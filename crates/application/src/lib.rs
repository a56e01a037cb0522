//! Application services and ports.

#![forbid(unsafe_code)]

mod generation_service;
mod identity_service;
mod post_service;
mod rate_limit_service;
mod session_token_service;

pub use generation_service::{
    ContentGenerator, DocumentUpload, GeneratedContent, GenerationPrompt, GenerationService,
    MAX_DOCUMENT_BYTES, MAX_TOTAL_DOCUMENT_BYTES, MIN_GENERATED_WORDS, decode_documents,
};
pub use identity_service::{
    DEFAULT_IDENTITY_TIMEOUT, IdentityProvider, IdentityService, LoginOutcome, UserRepository,
};
pub use post_service::{PostRepository, PostService};
pub use rate_limit_service::{
    AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService, UNKNOWN_CLIENT_KEY,
};
pub use session_token_service::{
    DEFAULT_SESSION_VALIDITY_DAYS, SessionClaims, SessionTokenCodec, SessionTokenService,
    bearer_token_from_header,
};
