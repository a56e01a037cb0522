use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use contentai_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

#[cfg(test)]
mod tests;

/// Multipart body cap for `/api/generate`: the 200KB document allowance plus form overhead.
const GENERATE_BODY_LIMIT: usize = 1024 * 1024;

pub fn build_router(app_state: AppState, allowed_origins: &[String]) -> Result<Router, AppError> {
    let login_routes = Router::new().route("/api/auth/google", post(auth::login_handler));

    let generate_routes = Router::new()
        .route(
            "/api/generate",
            post(handlers::generate::generate_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::optional_auth,
        ))
        .layer(DefaultBodyLimit::max(GENERATE_BODY_LIMIT));

    let post_write_routes = Router::new()
        .route("/api/posts", post(handlers::posts::save_post_handler))
        .route(
            "/api/posts/{post_id}",
            delete(handlers::posts::delete_post_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    // Every mutating route draws on one per-client budget. Throttling runs
    // before the caller is resolved.
    let throttled_routes = Router::new()
        .merge(login_routes)
        .merge(generate_routes)
        .merge(post_write_routes)
        .route_layer(from_fn_with_state(app_state.clone(), middleware::rate_limit));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/history", get(handlers::posts::history_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(throttled_routes)
        .merge(protected_routes)
        .layer(cors::build_cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
