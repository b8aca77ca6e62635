//! Request-scoped identity attached by the auth middleware.
//!
//! Both types travel in the request's extensions. Handlers take them with
//! `Extension<ClientIdentity>` / `Extension<Session>`; a handler mounted
//! behind the matching middleware can rely on the value being present.

/// Calling client, resolved from the `X-API-Key` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub name: String,
}

/// Account and role, resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: String,
    pub role: String,
}
