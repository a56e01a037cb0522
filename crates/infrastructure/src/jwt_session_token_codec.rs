//! HMAC-signed JWT implementation of the session token codec.

use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use contentai_application::{SessionClaims, SessionTokenCodec};
use contentai_core::{AppError, AppResult};

/// JWT codec bound to one shared secret and one HMAC algorithm.
pub struct JwtSessionTokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtSessionTokenCodec {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("JwtSessionTokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtSessionTokenCodec {
    /// Creates a codec for `secret` and an algorithm name such as `HS256`.
    ///
    /// Fails with [`AppError::Configuration`] for an empty secret or any
    /// algorithm outside the HMAC family.
    pub fn new(secret: &str, algorithm: &str) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::Configuration(
                "session signing secret must not be empty".to_owned(),
            ));
        }

        let algorithm = Algorithm::from_str(algorithm.trim()).map_err(|error| {
            AppError::Configuration(format!("unknown signing algorithm '{algorithm}': {error}"))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::Configuration(format!(
                "signing algorithm {algorithm:?} is not supported for shared-secret session tokens"
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl SessionTokenCodec for JwtSessionTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> AppResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(|error| {
            AppError::Configuration(format!("failed to sign session token: {error}"))
        })
    }

    fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}
