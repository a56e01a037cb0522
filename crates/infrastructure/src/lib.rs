//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod google_identity_verifier;
mod in_memory_post_repository;
mod in_memory_rate_limit_repository;
mod in_memory_user_repository;
mod jwt_session_token_codec;
mod openai_content_generator;
mod postgres_post_repository;
mod postgres_user_repository;

pub use google_identity_verifier::{GOOGLE_JWKS_URI, GoogleIdentityVerifier};
pub use in_memory_post_repository::InMemoryPostRepository;
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use jwt_session_token_codec::JwtSessionTokenCodec;
pub use openai_content_generator::{OpenAiContentGenerator, OpenAiSettings};
pub use postgres_post_repository::PostgresPostRepository;
pub use postgres_user_repository::PostgresUserRepository;
