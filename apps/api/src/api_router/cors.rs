use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use contentai_core::AppError;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub(super) fn build_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, AppError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|error| {
                AppError::Validation(format!("invalid ALLOWED_ORIGINS entry '{origin}': {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Sessions travel in the Authorization header, never in cookies.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}
