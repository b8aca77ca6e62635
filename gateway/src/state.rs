//! Shared application state.

use std::sync::Arc;

use crate::auth::account::AccountAuthenticator;
use crate::credentials::CredentialStore;
use crate::secret::SigningSecret;

/// State shared by every request.
///
/// Everything here is either immutable after startup (service name, secret)
/// or does its own synchronization (credential store, authenticator), so
/// cloning the state per request is a handful of reference-count bumps.
#[derive(Clone)]
pub struct GatewayState {
    /// Service name returned by `getServiceInfo`.
    pub service_name: Arc<str>,
    /// JWT signing secret for this process.
    pub secret: Arc<SigningSecret>,
    /// Client-name to API-key mapping.
    pub credentials: Arc<CredentialStore>,
    /// Account/password check used by login.
    pub authenticator: Arc<dyn AccountAuthenticator>,
}

impl GatewayState {
    #[must_use]
    pub fn new(
        service_name: &str,
        secret: SigningSecret,
        credentials: CredentialStore,
        authenticator: Arc<dyn AccountAuthenticator>,
    ) -> Self {
        Self {
            service_name: Arc::from(service_name),
            secret: Arc::new(secret),
            credentials: Arc::new(credentials),
            authenticator,
        }
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("service_name", &self.service_name)
            .field("secret", &self.secret)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
