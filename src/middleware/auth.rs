use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

const SESSION_COOKIE: &str = "session";

/// Handlers take `Session` as an argument; a request without a resolvable
/// session is rejected with 401 before the handler body runs.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).map_err(|msg| {
            tracing::debug!("Unauthenticated request to {}: {}", parts.uri.path(), msg);
            ApiError::unauthorized()
        })?;

        state.sessions.resolve(&token).ok_or_else(|| {
            tracing::debug!("Session token rejected for {}", parts.uri.path());
            ApiError::unauthorized()
        })
    }
}

/// Session token from `Authorization: Bearer`, falling back to the session cookie.
fn extract_token(headers: &HeaderMap) -> Result<String, &'static str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| "Invalid Authorization header format")?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or("Authorization header must use Bearer token format")?
            .trim();
        if token.is_empty() {
            return Err("Empty session token");
        }
        return Ok(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or("Missing session token")
}
