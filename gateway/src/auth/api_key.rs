//! API-key middleware.
//!
//! Guards the login route. The `X-API-Key` header must equal one of the keys
//! in the credential file; the owning client name is attached to the request
//! as a [`ClientIdentity`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::context::ClientIdentity;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejection reason when no stored key matches.
pub const NO_SUCH_API_KEY: &str = "no such API-Key, authentication failed";

/// Reject the request unless it presents a known API key.
///
/// # Errors
/// - `ApiError::CredentialStore` if the credential file cannot be loaded.
/// - `ApiError::Unauthorized` if the header is missing or matches no key.
pub async fn require_api_key(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = state.credentials.load().await.map_err(|e| {
        tracing::warn!("{e}");
        ApiError::CredentialStore
    })?;

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    let Some(client) = credentials.find_client(presented).map(str::to_string) else {
        tracing::warn!("{NO_SUCH_API_KEY}");
        return Err(ApiError::Unauthorized(NO_SUCH_API_KEY.to_string()));
    };

    request.extensions_mut().insert(ClientIdentity {
        name: client.clone(),
    });

    let response = next.run(request).await;
    tracing::info!(client = %client, "API-Key authentication succeeded");
    Ok(response)
}
