//! Route table.
//!
//! ```text
//! POST /api/v1/login           X-API-Key             -> login
//! GET  /api/v1/getServiceInfo  Authorization: Bearer -> get_service_info
//! ```
//!
//! Auth middleware is attached with `route_layer`, so unknown paths fall
//! through to a plain 404 instead of an auth failure.

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{
        HeaderName, Method,
        header::{
            ACCEPT_ENCODING, ACCEPT_LANGUAGE, ACCESS_CONTROL_REQUEST_HEADERS,
            ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE, ORIGIN,
        },
    },
    middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{api_key, session};
use crate::handlers;
use crate::state::GatewayState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 32 << 20;

pub const LOGIN_PATH: &str = "/api/v1/login";
pub const SERVICE_INFO_PATH: &str = "/api/v1/getServiceInfo";

/// Build the gateway's router over `state`.
#[must_use]
pub fn build_router(state: GatewayState) -> Router {
    let api_key_routes = Router::new()
        .route(LOGIN_PATH, post(handlers::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key::require_api_key,
        ));

    let session_routes = Router::new()
        .route(SERVICE_INFO_PATH, get(handlers::get_service_info))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    let service = Arc::clone(&state.service_name);
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request| {
        tracing::info_span!(
            "request",
            service = %service,
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .merge(api_key_routes)
        .merge(session_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .layer(trace)
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
            Method::PUT,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ORIGIN,
            ACCEPT_ENCODING,
            ACCEPT_LANGUAGE,
            ACCESS_CONTROL_REQUEST_METHOD,
            ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderName::from_static(api_key::API_KEY_HEADER),
        ])
}
