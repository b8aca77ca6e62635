//! Account/password check performed at login.
//!
//! The gateway does not own any account database. Login delegates to an
//! [`AccountAuthenticator`], which in a real deployment fronts an external
//! identity provider.

use async_trait::async_trait;

/// Error returned when an account cannot be authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorError(pub String);

impl std::fmt::Display for AuthenticatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "account authentication failed: {}", self.0)
    }
}

impl std::error::Error for AuthenticatorError {}

/// Checks an account's password.
#[async_trait]
pub trait AccountAuthenticator: Send + Sync {
    /// Returns `Ok(())` if `password` is valid for `account`.
    async fn authenticate(&self, account: &str, password: &str) -> Result<(), AuthenticatorError>;
}

/// Accepts every account/password pair.
///
/// This is the default until an identity provider is wired in; the binary
/// warns about it at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllAuthenticator;

#[async_trait]
impl AccountAuthenticator for AcceptAllAuthenticator {
    async fn authenticate(&self, _account: &str, _password: &str) -> Result<(), AuthenticatorError> {
        Ok(())
    }
}
