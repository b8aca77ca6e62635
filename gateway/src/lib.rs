// Life of a request:
// 1. CORS / body limit / tracing span
// 2. Login route:    X-API-Key checked against the credential file,
//                    client name attached, account checked, token issued
// 3. Resource route: bearer token verified against the process secret,
//                    account and role attached, handler runs
//
// System components:
//  - Credential store (flat JSON file, re-read per request)
//  - Signing secret (32 random bytes, generated at startup)
//  - Token issuer / verifier (HS256 JWT)

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod router;
pub mod secret;
pub mod state;

#[cfg(test)]
mod e2e_tests;

pub use config::GatewayConfig;
pub use router::build_router;
pub use state::GatewayState;
