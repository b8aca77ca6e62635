//! Authentication module.
//!
//! Two tiers guard the gateway's routes:
//!
//! 1. [`api_key::require_api_key`] admits known clients to the login route.
//! 2. [`session::require_session`] admits holders of a session token, issued
//!    by login through [`jwt::issue_token`], to resource routes.
//!
//! # Post-conditions
//! - A request that passes a tier carries that tier's identity
//!   ([`ClientIdentity`] or [`Session`]) in its extensions.
//!
//! # Invariants
//! - A rejected request never reaches its handler.

pub mod account;
pub mod api_key;
pub mod context;
pub mod jwt;
pub mod session;

pub use account::{AcceptAllAuthenticator, AccountAuthenticator, AuthenticatorError};
pub use context::{ClientIdentity, Session};
pub use jwt::{Claims, JwtError};
