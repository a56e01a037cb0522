use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contentai_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

// Extractor rejections answer with the same `{ "message" }` body as every
// other client error.
macro_rules! rejection_as_validation {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self(AppError::Validation(rejection.body_text()))
                }
            }
        )+
    };
}

rejection_as_validation!(
    JsonRejection,
    QueryRejection,
    PathRejection,
    MultipartRejection,
    MultipartError,
);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        // Server-side failures are logged in full and answered generically.
        let message = match &self.0 {
            AppError::Upstream(_) => {
                error!(error = %self.0, "upstream failure");
                "upstream service unavailable".to_owned()
            }
            AppError::Configuration(_) | AppError::Internal(_) => {
                error!(error = %self.0, "internal failure");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::MissingOrMalformedHeader | AppError::InvalidToken | AppError::InvalidIdentity => {
            StatusCode::UNAUTHORIZED
        }
        AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        AppError::Configuration(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
