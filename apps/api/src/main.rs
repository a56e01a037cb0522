//! ContentAI API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod auth;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use contentai_application::{
    GenerationService, IdentityService, PostRepository, PostService, RateLimitService,
    SessionTokenService, UserRepository,
};
use contentai_core::AppError;
use contentai_infrastructure::{
    GoogleIdentityVerifier, InMemoryPostRepository, InMemoryRateLimitRepository,
    InMemoryUserRepository, JwtSessionTokenCodec, OpenAiContentGenerator, OpenAiSettings,
    PostgresPostRepository, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let (user_repository, post_repository) =
        build_repositories(config.database_url.as_deref()).await?;

    let codec = JwtSessionTokenCodec::new(&config.jwt_secret, &config.jwt_algorithm)?;
    let session_token_service =
        SessionTokenService::new(Arc::new(codec), config.jwt_expiration_days);

    let identity_provider =
        GoogleIdentityVerifier::new(config.google_jwks_uri.clone(), config.identity_timeout)?;
    let identity_service = IdentityService::new(
        Arc::new(identity_provider),
        user_repository,
        session_token_service.clone(),
        config.google_client_id.clone(),
    )
    .with_verification_timeout(config.identity_timeout);

    let generator = OpenAiContentGenerator::new(OpenAiSettings {
        api_key: config.openai.api_key.clone(),
        base_url: config.openai.base_url.clone(),
        model: config.openai.model.clone(),
        max_tokens: config.openai.max_tokens,
        temperature: config.openai.temperature,
        timeout: GENERATION_TIMEOUT,
    })?;

    let app_state = AppState {
        rate_limit_service: RateLimitService::new(Arc::new(InMemoryRateLimitRepository::new())),
        rate_limit_rule: config.rate_limit_rule(),
        session_token_service,
        identity_service,
        generation_service: GenerationService::new(Arc::new(generator), post_repository.clone()),
        post_service: PostService::new(post_repository),
        trusted_proxies: config.trusted_proxies.clone().into(),
    };

    let app = api_router::build_router(app_state, &config.allowed_origins)?;

    let address = config.socket_address()?;
    info!(%address, "contentai api listening");

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

/// Postgres-backed stores when a database is configured, in-memory ones otherwise.
async fn build_repositories(
    database_url: Option<&str>,
) -> Result<(Arc<dyn UserRepository>, Arc<dyn PostRepository>), AppError> {
    let Some(database_url) = database_url else {
        warn!("DATABASE_URL is not set, users and posts are kept in memory and lost on restart");
        return Ok((
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok((
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresPostRepository::new(pool)),
    ))
}
