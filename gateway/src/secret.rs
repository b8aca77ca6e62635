//! Process-lifetime JWT signing secret.
//!
//! # Post-conditions
//! - A generated secret is exactly [`SECRET_LEN`] bytes from the OS CSPRNG.
//!
//! # Invariants
//! - The secret is never persisted or logged. Restarting the process
//!   invalidates every token signed with the previous secret.

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;

/// Length of the signing secret in bytes.
pub const SECRET_LEN: usize = 32;

/// Error returned when the operating system cannot supply random bytes.
#[derive(Debug)]
pub struct SecretError(String);

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generate signing secret failed: {}", self.0)
    }
}

impl std::error::Error for SecretError {}

/// HMAC key shared read-only by the token issuer and verifier.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret([u8; SECRET_LEN]);

impl SigningSecret {
    /// Generate a fresh secret from the operating system's CSPRNG.
    ///
    /// # Errors
    /// Returns `SecretError` if the OS random source is unavailable.
    pub fn generate() -> Result<Self, SecretError> {
        let mut bytes = [0_u8; SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SecretError(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Wrap known key material. Used by tests and tools that need
    /// reproducible tokens.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}
