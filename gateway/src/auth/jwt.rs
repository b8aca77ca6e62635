//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the process [`SigningSecret`].
//!
//! # Pre-conditions
//! - The secret is the one generated at startup; tokens signed with any
//!   other secret are rejected.
//!
//! # Post-conditions
//! - A freshly issued token verifies until `exp`, twenty minutes after issue.
//! - Verification failures are classified into a fixed set of reasons.
//!
//! # Invariants
//! - Verification is stateless: no revocation list, no server-side session.
//! - Zero leeway: `nbf <= now <= exp` exactly.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::secret::SigningSecret;

/// Value of the `iss` claim on every token this gateway issues.
pub const TOKEN_ISSUER: &str = "JWT";

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: u64 = 20 * 60;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub account: String,
    pub role: String,
    pub aud: String,
    pub exp: u64,
    pub jti: String,
    pub iat: u64,
    pub iss: String,
    pub nbf: u64,
    pub sub: String,
}

impl Claims {
    /// Build the claim set for `account` issued at `now` (unix seconds).
    #[must_use]
    pub fn new(account: &str, role: &str, now: u64) -> Self {
        Self {
            account: account.to_string(),
            role: role.to_string(),
            aud: account.to_string(),
            exp: now + TOKEN_TTL_SECS,
            // Two logins for the same account within one second share an id.
            jti: format!("{account}{now}"),
            iat: now,
            iss: TOKEN_ISSUER.to_string(),
            nbf: now,
            sub: account.to_string(),
        }
    }
}

/// Reason a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// The token is not a well-formed JWT or its claims have the wrong shape.
    Malformed,
    /// The token names an algorithm or key type this gateway does not accept.
    Unverifiable,
    /// The signature does not match the current secret.
    InvalidSignature,
    /// `exp` is in the past.
    Expired,
    /// `nbf` is in the future.
    NotValidYet,
    /// Any other validation failure.
    Other,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "token is malformed"),
            Self::Unverifiable => {
                write!(f, "token could not be verified because of signing problems")
            }
            Self::InvalidSignature => write!(f, "signature validation failed"),
            Self::Expired => write!(f, "token is expired"),
            Self::NotValidYet => write!(f, "token is not valid yet"),
            Self::Other => write!(f, "can not handle this token"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Error returned when a token cannot be signed.
#[derive(Debug)]
pub struct IssueError(jsonwebtoken::errors::Error);

impl std::fmt::Display for IssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sign token failed: {}", self.0)
    }
}

impl std::error::Error for IssueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Current unix time in seconds.
#[must_use]
pub fn now() -> u64 {
    jsonwebtoken::get_current_timestamp()
}

/// Issue a token for `account` with `role`, valid from now for
/// [`TOKEN_TTL_SECS`].
///
/// # Errors
/// Returns `IssueError` if signing fails.
pub fn issue_token(secret: &SigningSecret, account: &str, role: &str) -> Result<String, IssueError> {
    issue_token_at(secret, account, role, now())
}

/// Issue a token as if the current time were `issued_at`.
///
/// # Errors
/// Returns `IssueError` if signing fails.
pub fn issue_token_at(
    secret: &SigningSecret,
    account: &str,
    role: &str,
    issued_at: u64,
) -> Result<String, IssueError> {
    let claims = Claims::new(account, role, issued_at);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(IssueError)
}

/// Verify `token` against `secret` and return its claims.
///
/// # Errors
/// Returns the `JwtError` classification of the first failed check.
pub fn verify_token(token: &str, secret: &SigningSecret) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &key, &validation())
        .map(|data| data.claims)
        .map_err(map_jwt_error)
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // `aud` is the account itself, so there is no fixed audience to check.
    validation.validate_aud = false;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
    validation
}

/// Maps jsonwebtoken errors to our JwtError type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => JwtError::Malformed,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => JwtError::Unverifiable,
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::ImmatureSignature => JwtError::NotValidYet,
        _ => JwtError::Other,
    }
}
