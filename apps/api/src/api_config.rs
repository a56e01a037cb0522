use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use contentai_application::{DEFAULT_SESSION_VALIDITY_DAYS, RateLimitRule};
use contentai_core::AppError;
use contentai_infrastructure::GOOGLE_JWKS_URI;
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub allowed_origins: Vec<String>,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub jwt_expiration_days: i64,
    pub google_client_id: String,
    pub google_jwks_uri: String,
    pub identity_timeout: Duration,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: i64,
    pub trusted_proxies: Vec<IpNet>,
    pub openai: OpenAiConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 3001_u16)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let jwt_secret = required_non_empty_env("JWT_SECRET")?;
        let jwt_algorithm = env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_owned());
        let jwt_expiration_days = parsed_env("JWT_EXPIRATION_DAYS", DEFAULT_SESSION_VALIDITY_DAYS)?;
        if !(1..=3650).contains(&jwt_expiration_days) {
            return Err(AppError::Validation(
                "JWT_EXPIRATION_DAYS must be between 1 and 3650".to_owned(),
            ));
        }

        let google_client_id = required_non_empty_env("GOOGLE_CLIENT_ID")?;
        let google_jwks_uri =
            env::var("GOOGLE_JWKS_URI").unwrap_or_else(|_| GOOGLE_JWKS_URI.to_owned());
        let identity_timeout =
            Duration::from_secs(parsed_env("IDENTITY_TIMEOUT_SECONDS", 10_u64)?);

        let rate_limit_requests = parsed_env("RATE_LIMIT_REQUESTS", 30_u32)?;
        let rate_limit_window_seconds = parsed_env("RATE_LIMIT_WINDOW_SECONDS", 60_i64)?;
        if rate_limit_window_seconds <= 0 {
            return Err(AppError::Validation(
                "RATE_LIMIT_WINDOW_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let trusted_proxies = parse_trusted_proxies(
            env::var("TRUSTED_PROXIES").unwrap_or_default().as_str(),
        )?;

        let openai = OpenAiConfig {
            api_key: required_non_empty_env("OPENAI_API_KEY")?,
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_owned()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_owned()),
            max_tokens: parsed_env("OPENAI_MAX_TOKENS", 1000_u32)?,
            temperature: parsed_env("OPENAI_TEMPERATURE", 0.7_f32)?,
        };

        Ok(Self {
            api_host,
            api_port,
            allowed_origins,
            database_url,
            jwt_secret,
            jwt_algorithm,
            jwt_expiration_days,
            google_client_id,
            google_jwks_uri,
            identity_timeout,
            rate_limit_requests,
            rate_limit_window_seconds,
            trusted_proxies,
            openai,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn rate_limit_rule(&self) -> RateLimitRule {
        RateLimitRule::new(self.rate_limit_requests, self.rate_limit_window_seconds)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

pub fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            // Bare addresses are accepted as single-host networks.
            IpNet::from_str(entry)
                .or_else(|_| IpAddr::from_str(entry).map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!("invalid TRUSTED_PROXIES entry '{entry}': {error}"))
                })
        })
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
