use axum::extract::State;
use axum::{Extension, Json};
use contentai_core::Caller;
use tracing::info;

use crate::dto::{LoginRequest, LoginResponse, UserResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Exchanges a Google ID token for a session token.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let outcome = state.identity_service.login(payload.token.as_str()).await?;
    info!(user_id = %outcome.user.id, "user signed in with google");

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user.into(),
    }))
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.identity_service.find_user(caller.subject()).await?;
    Ok(Json(user.into()))
}
