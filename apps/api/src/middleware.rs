use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use contentai_application::UNKNOWN_CLIENT_KEY;
use contentai_core::Caller;
use ipnet::IpNet;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Draws one request from the client's budget, shared by every throttled route.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let client_key = client_key(peer, request.headers(), &state.trusted_proxies);

    state
        .rate_limit_service
        .check_rate_limit(&state.rate_limit_rule, client_key.as_str())
        .await?;

    Ok(next.run(request).await)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let subject = state
        .session_token_service
        .verify_header(authorization_header(request.headers()))?;

    request
        .extensions_mut()
        .insert(Caller::authenticated(subject));
    Ok(next.run(request).await)
}

/// Attaches the caller when a valid bearer token is present and falls back to
/// [`Caller::Anonymous`] otherwise. Never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header_value = authorization_header(request.headers());
    let caller = match header_value {
        None => Caller::Anonymous,
        Some(_) => match state.session_token_service.verify_header(header_value) {
            Ok(subject) => Caller::authenticated(subject),
            Err(error) => {
                debug!(%error, "ignoring unusable bearer token on optional-auth route");
                Caller::Anonymous
            }
        },
    };

    request.extensions_mut().insert(caller);
    next.run(request).await
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Resolves the rate limit key for a request.
///
/// `X-Forwarded-For` is only honoured when the direct peer is a trusted proxy;
/// otherwise any client could pick its own bucket.
pub fn client_key(peer: Option<IpAddr>, headers: &HeaderMap, trusted_proxies: &[IpNet]) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_CLIENT_KEY.to_owned();
    };

    if trusted_proxies.iter().any(|network| network.contains(&peer))
        && let Some(forwarded) = first_forwarded_hop(headers)
    {
        return forwarded.to_string();
    }

    peer.to_string()
}

fn first_forwarded_hop(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
}
