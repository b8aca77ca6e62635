//! HTTP error envelopes.
//!
//! Authentication failures answer `{"error": ...}`; request and business
//! failures answer `{"message": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message returned when the credential file cannot be used.
pub const CREDENTIAL_STORE_FAILED: &str = "API-Key process failed, please connect admin.";

/// Body of a 401/500 authentication failure.
#[derive(Debug, Serialize)]
pub struct AuthFailedBody {
    pub error: String,
}

/// Body of a 400 request failure.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Error surfaced to an HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 with the rejection reason.
    Unauthorized(String),
    /// 500; the credential file is missing or malformed.
    CredentialStore,
    /// 400 with a human-readable message.
    BadRequest(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::CredentialStore => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(reason) | Self::BadRequest(reason) => write!(f, "{reason}"),
            Self::CredentialStore => write!(f, "{CREDENTIAL_STORE_FAILED}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Unauthorized(error) => (status, Json(AuthFailedBody { error })).into_response(),
            Self::CredentialStore => (
                status,
                Json(AuthFailedBody {
                    error: CREDENTIAL_STORE_FAILED.to_string(),
                }),
            )
                .into_response(),
            Self::BadRequest(message) => (status, Json(MessageBody { message })).into_response(),
        }
    }
}
