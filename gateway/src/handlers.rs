//! Route handlers.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::auth::context::{ClientIdentity, Session};
use crate::auth::jwt;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Role granted to every account that logs in.
pub const MEMBER_ROLE: &str = "Member";

/// Body of `POST /api/v1/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Successful `GET /api/v1/getServiceInfo`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoResponse {
    pub service_name: String,
}

/// Exchange an account/password for a session token.
///
/// Mounted behind the API-key middleware, which supplies the caller's
/// [`ClientIdentity`].
pub async fn login(
    State(state): State<GatewayState>,
    Extension(client): Extension<ClientIdentity>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let client = client.name;

    let Json(body) = payload.map_err(|rejection| {
        let message = format!("Client {client} bad request: {}", rejection.body_text());
        tracing::warn!("{message}");
        ApiError::BadRequest(message)
    })?;
    let account = body.account;

    tracing::info!("Client {client} try to login account {account}");

    if let Err(e) = state.authenticator.authenticate(&account, &body.password).await {
        tracing::warn!("Client {client} try to login account {account}, but auth blockchain CA failed: {e}");
        return Err(ApiError::BadRequest(format!(
            "Account {account} auth blockchain CA failed."
        )));
    }

    tracing::info!("Client {client} login account {account} auth blockchain CA succeeded");

    let token = jwt::issue_token(&state.secret, &account, MEMBER_ROLE).map_err(|e| {
        tracing::warn!("Client {client} login account {account} generate token failed: {e}");
        ApiError::BadRequest(format!("Account {account} generate token failed."))
    })?;

    tracing::info!("Client {client} login account {account} token issued");

    Ok(Json(LoginResponse { token }))
}

/// Report the configured service name.
///
/// Mounted behind the session middleware, which supplies the caller's
/// [`Session`].
pub async fn get_service_info(
    State(state): State<GatewayState>,
    Extension(session): Extension<Session>,
) -> Json<ServiceInfoResponse> {
    tracing::info!("{} fetch service info", session.account);

    Json(ServiceInfoResponse {
        service_name: state.service_name.to_string(),
    })
}
