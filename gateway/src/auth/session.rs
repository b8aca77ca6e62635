//! Bearer-token middleware.
//!
//! Guards resource routes. The `Authorization` header must be exactly
//! `Bearer <token>` and the token must verify against the process secret.
//! On success the token's account and role are attached to the request as a
//! [`Session`]; on any failure the request stops here with a 401.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::context::Session;
use crate::auth::jwt;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Literal prefix of a bearer `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Rejection reason for a header that is not `Bearer <token>`.
pub const BAD_BEARER_FORMAT: &str = "bearer format is not correct";

/// Extract the token from a bearer header value.
///
/// Returns `None` unless the value is the prefix followed by one non-empty
/// token with no whitespace in it.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Reject the request unless it carries a valid session token.
///
/// # Errors
/// Returns `ApiError::Unauthorized` with the bearer-format message or the
/// token's `JwtError` classification.
pub async fn require_session(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(token) = parse_bearer(header) else {
        tracing::warn!("{BAD_BEARER_FORMAT}");
        return Err(ApiError::Unauthorized(BAD_BEARER_FORMAT.to_string()));
    };

    let claims = jwt::verify_token(token, &state.secret).map_err(|e| {
        tracing::warn!(reason = %e, "API queried auth failed");
        ApiError::Unauthorized(e.to_string())
    })?;

    let account = claims.account.clone();
    request.extensions_mut().insert(Session {
        account: claims.account,
        role: claims.role,
    });

    let response = next.run(request).await;
    tracing::info!(account = %account, "API queried succeeded");
    Ok(response)
}
