//! Credential store reader.
//!
//! The credential file is a flat JSON object mapping client names to API
//! keys:
//!
//! ```json
//! { "alice": "key123", "billing-batch": "6f1c..." }
//! ```
//!
//! # Pre-conditions
//! - The file is maintained outside the gateway; the gateway never writes it.
//!
//! # Post-conditions
//! - With [`ReloadPolicy::Always`] every lookup reflects the file as it is on
//!   disk at that moment, so deleting a line revokes the key immediately.
//! - With [`ReloadPolicy::OnModified`] the parsed mapping is reused until the
//!   file's modification time or length changes.
//!
//! # Invariants
//! - Failed reads are never cached.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use subtle::ConstantTimeEq;

/// Errors that can occur when loading the credential file.
#[derive(Debug)]
pub enum CredentialError {
    /// The file is missing or unreadable.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not a JSON object of string values.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "read API-Key file {} failed: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "parse API-Key file {} failed: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// When the credential file is re-parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Read and parse the file on every lookup.
    #[default]
    Always,
    /// Reuse the last parse while the file's mtime and length are unchanged.
    OnModified,
}

/// Parsed client-name to API-key mapping.
///
/// Entries are ordered by client name, so when two clients share a key the
/// alphabetically first one is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    keys: BTreeMap<String, String>,
}

impl Credentials {
    /// Parse credentials from the JSON text of a credential file.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let keys = serde_json::from_slice(bytes)?;
        Ok(Self { keys })
    }

    /// Find the client owning `presented`, compared as raw bytes so
    /// non-ASCII keys match their UTF-8 encoding.
    ///
    /// Every entry is compared in constant time and the scan never stops
    /// early. An empty key never matches.
    #[must_use]
    pub fn find_client(&self, presented: &[u8]) -> Option<&str> {
        if presented.is_empty() {
            return None;
        }

        let mut found = None;
        for (client, key) in &self.keys {
            let equal: bool = key.as_bytes().ct_eq(presented).into();
            if equal && found.is_none() {
                found = Some(client.as_str());
            }
        }
        found
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read and parse a credential file.
pub async fn read_credentials(path: &Path) -> Result<Credentials, CredentialError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Credentials::from_json(&bytes).map_err(|source| CredentialError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
struct CachedCredentials {
    modified: SystemTime,
    len: u64,
    credentials: Arc<Credentials>,
}

/// Credential file handle shared by all requests.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    policy: ReloadPolicy,
    cache: RwLock<Option<CachedCredentials>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: PathBuf, policy: ReloadPolicy) -> Self {
        Self {
            path,
            policy,
            cache: RwLock::new(None),
        }
    }

    /// Load the current credentials according to the reload policy.
    pub async fn load(&self) -> Result<Arc<Credentials>, CredentialError> {
        match self.policy {
            ReloadPolicy::Always => read_credentials(&self.path).await.map(Arc::new),
            ReloadPolicy::OnModified => self.load_if_modified().await,
        }
    }

    async fn load_if_modified(&self) -> Result<Arc<Credentials>, CredentialError> {
        // An edit within the filesystem's mtime granularity keeps the mtime,
        // so the length is part of the cache key too.
        let (modified, len) = tokio::fs::metadata(&self.path)
            .await
            .and_then(|metadata| Ok((metadata.modified()?, metadata.len())))
            .map_err(|source| CredentialError::Io {
                path: self.path.clone(),
                source,
            })?;

        if let Some(credentials) = self.cached(modified, len) {
            return Ok(credentials);
        }

        let credentials = Arc::new(read_credentials(&self.path).await?);
        tracing::debug!(
            path = %self.path.display(),
            clients = credentials.len(),
            "reloaded API-Key file"
        );

        // A poisoned lock only means another reload panicked; the cache is
        // still a complete value or None.
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cache = Some(CachedCredentials {
            modified,
            len,
            credentials: Arc::clone(&credentials),
        });

        Ok(credentials)
    }

    fn cached(&self, modified: SystemTime, len: u64) -> Option<Arc<Credentials>> {
        let cache = self
            .cache
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cache
            .as_ref()
            .filter(|entry| entry.modified == modified && entry.len == len)
            .map(|entry| Arc::clone(&entry.credentials))
    }
}
