//! Google ID token verification against Google's published signing keys.
//!
//! Keys are fetched from the JWKS endpoint and cached for ten minutes. A token
//! signed with a key id missing from the cache forces a refetch, which covers
//! Google's key rotation. Refetches are at least thirty seconds apart, so
//! tokens with made-up key ids cannot drive traffic to Google.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use contentai_application::IdentityProvider;
use contentai_core::{AppError, AppResult};
use contentai_domain::IdentityClaims;


/// Google's public JWKS endpoint for ID token signing keys.
pub const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google uses for ID tokens.
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Hosts a JWKS URI may point at.
const ALLOWED_JWKS_HOSTS: &[&str] = &["www.googleapis.com"];

/// Maximum accepted JWKS response size.
const MAX_JWKS_SIZE: usize = 512 * 1024;

const JWKS_CACHE_TTL_SECS: u64 = 600;

/// Minimum time between two JWKS fetches.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

/// Clock skew tolerated on `exp`.
const LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// Claims read from a verified Google ID token. `iss`, `aud`, and `exp` are
/// checked by the decoder and not kept.
#[derive(Debug, Deserialize)]
struct GoogleIdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Identity provider adapter for Google Sign-In ID tokens.
#[derive(Clone)]
pub struct GoogleIdentityVerifier {
    http_client: Client,
    jwks_uri: String,
    jwks_cache: Cache<String, JwkSet>,
    last_fetch: Arc<Mutex<Option<Instant>>>,
}

impl GoogleIdentityVerifier {
    /// Creates a verifier reading keys from `jwks_uri`.
    ///
    /// The URI must be https and point at an allowed Google host.
    pub fn new(jwks_uri: impl Into<String>, fetch_timeout: Duration) -> AppResult<Self> {
        let jwks_uri = jwks_uri.into();
        validate_jwks_uri(jwks_uri.as_str())?;

        let http_client = Client::builder()
            .timeout(fetch_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|error| {
                AppError::Configuration(format!("failed to build JWKS http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            jwks_uri,
            jwks_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(JWKS_CACHE_TTL_SECS))
                .build(),
            last_fetch: Arc::new(Mutex::new(None)),
        })
    }

    async fn key_for(&self, kid: &str) -> AppResult<Jwk> {
        if let Some(key) = self.cached_key(kid) {
            return Ok(key);
        }

        // Held across the fetch so concurrent misses share one request.
        let mut last_fetch = self.last_fetch.lock().await;
        if let Some(key) = self.cached_key(kid) {
            return Ok(key);
        }

        if let Some(fetched_at) = *last_fetch
            && fetched_at.elapsed() < MIN_REFETCH_INTERVAL
        {
            debug!(kid, "Google JWKS fetched recently, not refetching");
            return Err(unknown_kid(kid));
        }

        info!(kid, "signing key not cached, fetching Google JWKS");
        *last_fetch = Some(Instant::now());
        let fetched = self.fetch_jwks().await?;
        let key = find_key(&fetched, kid);
        self.jwks_cache.insert(self.jwks_uri.clone(), fetched);

        key.ok_or_else(|| unknown_kid(kid))
    }

    fn cached_key(&self, kid: &str) -> Option<Jwk> {
        self.jwks_cache
            .get(&self.jwks_uri)
            .and_then(|cached| find_key(&cached, kid))
    }

    async fn fetch_jwks(&self) -> AppResult<JwkSet> {
        let response = self
            .http_client
            .get(self.jwks_uri.as_str())
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("failed to fetch Google JWKS: {error}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Google JWKS endpoint returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| AppError::Upstream(format!("failed to read Google JWKS: {error}")))?;
        if bytes.len() > MAX_JWKS_SIZE {
            return Err(AppError::Upstream(format!(
                "Google JWKS response too large: {} bytes",
                bytes.len()
            )));
        }

        let jwks: JwkSet = serde_json::from_slice(&bytes)
            .map_err(|error| AppError::Upstream(format!("failed to parse Google JWKS: {error}")))?;
        debug!(keys = jwks.keys.len(), "fetched Google JWKS");

        Ok(jwks)
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityVerifier {
    async fn verify(
        &self,
        raw_token: &str,
        expected_audience: &str,
    ) -> AppResult<IdentityClaims> {
        let header = decode_header(raw_token).map_err(|error| {
            AppError::Validation(format!("failed to decode ID token header: {error}"))
        })?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Validation("ID token header has no kid".to_owned()))?;

        let jwk = self.key_for(kid.as_str()).await?;
        let (decoding_key, algorithm) = decoding_key(&jwk)?;

        // The algorithm comes from the key, never from the token header.
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[expected_audience]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = LEEWAY_SECS;

        let claims = decode::<GoogleIdTokenClaims>(raw_token, &decoding_key, &validation)
            .map_err(|error| AppError::Validation(format!("ID token rejected: {error}")))?
            .claims;

        let email = claims
            .email
            .ok_or_else(|| AppError::Validation("ID token carries no email".to_owned()))?;

        IdentityClaims::new(claims.sub, email, claims.name, claims.picture)
    }
}

fn validate_jwks_uri(jwks_uri: &str) -> AppResult<()> {
    let url = Url::parse(jwks_uri)
        .map_err(|error| AppError::Configuration(format!("invalid JWKS URI: {error}")))?;

    if url.scheme() != "https" {
        return Err(AppError::Configuration(
            "JWKS URI must use https".to_owned(),
        ));
    }

    let host = url.host_str().unwrap_or_default();
    if !ALLOWED_JWKS_HOSTS.contains(&host) {
        return Err(AppError::Configuration(format!(
            "JWKS host '{host}' is not allowed"
        )));
    }

    Ok(())
}

fn unknown_kid(kid: &str) -> AppError {
    AppError::Validation(format!("no Google signing key matches kid '{kid}'"))
}

fn find_key(jwks: &JwkSet, kid: &str) -> Option<Jwk> {
    jwks.keys
        .iter()
        .find(|key| key.kid.as_deref() == Some(kid))
        .cloned()
}

fn decoding_key(jwk: &Jwk) -> AppResult<(DecodingKey, Algorithm)> {
    if jwk.kty != "RSA" {
        return Err(AppError::Validation(format!(
            "unsupported JWK key type '{}'",
            jwk.kty
        )));
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        return Err(AppError::Validation(
            "RSA JWK is missing its modulus or exponent".to_owned(),
        ));
    };
    let key = DecodingKey::from_rsa_components(n, e).map_err(|error| {
        AppError::Validation(format!("failed to build RSA decoding key: {error}"))
    })?;

    let algorithm = match jwk.alg.as_deref() {
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        _ => Algorithm::RS256,
    };

    Ok((key, algorithm))
}
