//! Gateway configuration module.
//!
//! This module provides configuration loading for the gateway from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `GATEWAY_SERVICE_NAME`: Name reported by `getServiceInfo` and attached to every log span (required)
//! - `GATEWAY_API_KEY_FILE`: Path to the JSON credential file (required)
//! - `GATEWAY_LISTEN_HOST`: Address to bind (default: `0.0.0.0`)
//! - `GATEWAY_LISTEN_PORT`: Port to listen on (default: `8080`)
//! - `GATEWAY_MODE`: `debug` or `release` (default: `release`)
//! - `GATEWAY_PROTOCOL`: `http` or `https` (default: `http`)
//! - `GATEWAY_CREDENTIAL_RELOAD`: `always` or `on-modified` (default: `always`)
//!
//! # Invariants
//!
//! - `service_name` and `api_key_file` are never empty
//! - `listen_port` is always a valid port number (1-65535)

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::credentials::ReloadPolicy;

/// Deployment mode.
///
/// Debug mode logs human-readable lines at debug level; release mode logs
/// JSON lines at info level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Debug,
    Release,
}

impl Mode {
    /// Default `EnvFilter` directive when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_log_filter(self) -> &'static str {
        match self {
            Self::Debug => "gateway=debug,tower_http=debug",
            Self::Release => "gateway=info,tower_http=info",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Scheme advertised for the listening address.
///
/// TLS termination happens in front of the gateway; this only affects how the
/// address is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Gateway configuration.
///
/// # Pre-conditions
///
/// When constructed via `from_env()`:
/// - All required environment variables must be set and non-empty
/// - All values must be valid for their respective types
///
/// # Post-conditions
///
/// - `listen_port` is always in the valid range (1-65535)
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Service name returned by the protected resource endpoint.
    pub service_name: String,
    /// Path of the JSON credential file mapping client names to API keys.
    pub api_key_file: PathBuf,
    /// Address to bind.
    pub listen_host: IpAddr,
    /// Port to bind.
    pub listen_port: u16,
    /// Deployment mode.
    pub mode: Mode,
    /// Advertised scheme.
    pub protocol: Protocol,
    /// When the credential file is re-parsed.
    pub credential_reload: ReloadPolicy,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const SERVICE_NAME: &str = "GATEWAY_SERVICE_NAME";
const API_KEY_FILE: &str = "GATEWAY_API_KEY_FILE";
const LISTEN_HOST: &str = "GATEWAY_LISTEN_HOST";
const LISTEN_PORT: &str = "GATEWAY_LISTEN_PORT";
const MODE: &str = "GATEWAY_MODE";
const PROTOCOL: &str = "GATEWAY_PROTOCOL";
const CREDENTIAL_RELOAD: &str = "GATEWAY_CREDENTIAL_RELOAD";

impl GatewayConfig {
    /// Default port for the gateway.
    pub const DEFAULT_PORT: u16 = 8080;
    /// Default bind address.
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or empty, or if any
    /// variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this function over `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = required(&lookup, SERVICE_NAME)?;
        let api_key_file = PathBuf::from(required(&lookup, API_KEY_FILE)?);
        let listen_host = load_listen_host(&lookup)?;
        let listen_port = load_listen_port(&lookup)?;
        let mode = load_mode(&lookup)?;
        let protocol = load_protocol(&lookup)?;
        let credential_reload = load_credential_reload(&lookup)?;

        Ok(Self {
            service_name,
            api_key_file,
            listen_host,
            listen_port,
            mode,
            protocol,
            credential_reload,
        })
    }
}

/// Load a required, non-empty variable.
fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: "must not be empty".to_string(),
        });
    }

    Ok(value)
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message,
    }
}

fn load_listen_host<F>(lookup: &F) -> Result<IpAddr, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(LISTEN_HOST).unwrap_or_else(|| GatewayConfig::DEFAULT_HOST.to_string());
    value
        .parse::<IpAddr>()
        .map_err(|_| invalid(LISTEN_HOST, format!("'{value}' is not an IP address")))
}

/// Returns the default if not set.
///
/// # Errors
///
/// Returns an error if the value is set but not a valid port number.
fn load_listen_port<F>(lookup: &F) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(LISTEN_PORT) {
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(invalid(
                LISTEN_PORT,
                format!("'{value}' is not a valid port number (must be 1-65535)"),
            )),
        },
        None => Ok(GatewayConfig::DEFAULT_PORT),
    }
}

fn load_mode<F>(lookup: &F) -> Result<Mode, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(MODE).map(|value| value.to_ascii_lowercase()).as_deref() {
        None | Some("release") => Ok(Mode::Release),
        Some("debug") => Ok(Mode::Debug),
        Some(other) => Err(invalid(
            MODE,
            format!("no such mode '{other}' (expected 'debug' or 'release')"),
        )),
    }
}

fn load_protocol<F>(lookup: &F) -> Result<Protocol, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(PROTOCOL).map(|value| value.to_ascii_lowercase()).as_deref() {
        None | Some("http") => Ok(Protocol::Http),
        Some("https") => Ok(Protocol::Https),
        Some(other) => Err(invalid(
            PROTOCOL,
            format!("'{other}' is not a supported protocol (expected 'http' or 'https')"),
        )),
    }
}

fn load_credential_reload<F>(lookup: &F) -> Result<ReloadPolicy, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(CREDENTIAL_RELOAD)
        .map(|value| value.to_ascii_lowercase())
        .as_deref()
    {
        None | Some("always") => Ok(ReloadPolicy::Always),
        Some("on-modified") => Ok(ReloadPolicy::OnModified),
        Some(other) => Err(invalid(
            CREDENTIAL_RELOAD,
            format!("'{other}' is not a reload policy (expected 'always' or 'on-modified')"),
        )),
    }
}
