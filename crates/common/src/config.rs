//! Configuration structures for synthd
//!
//! Server and client configuration is layered: serde defaults, then an
//! optional YAML file, then `SYNTHD_`-prefixed environment variables
//! (nested keys separated by `__`, e.g. `SYNTHD_BACKEND__SERVE_ERRORS=true`).
//! Command-line flags are applied on top by the binaries.
//!
//! Configuration is read once at startup and never mutated afterwards.

use crate::error::{Result, ServiceError};
use crate::frequency::Frequency;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for all configuration overrides
pub const ENV_PREFIX: &str = "SYNTHD";

/// Configuration for the synthesis server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port (0 lets the OS pick one)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timing backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Fixed-behaviour backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Maximum frequency reported for every design, in Hz
    #[serde(default = "default_max_frequency_hz")]
    pub max_frequency_hz: f64,

    /// Fail every compile request
    #[serde(default)]
    pub serve_errors: bool,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Configuration for the one-shot synthesis client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection establishment timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_max_frequency_hz() -> f64 {
    1_000_000_000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            max_frequency_hz: default_max_frequency_hz(),
            serve_errors: false,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            backend: BackendConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Build a layered configuration source and deserialize it
fn load_layered<T>(path: Option<&Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let mut builder = ::config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ServiceError::config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        builder = builder.add_source(::config::File::from(path));
    }

    let settings = builder
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl BackendConfig {
    /// Maximum achievable frequency as a typed value
    pub fn max_frequency(&self) -> Frequency {
        Frequency::new(self.max_frequency_hz)
    }

    /// Validate backend configuration
    pub fn validate(&self) -> Result<()> {
        if !self.max_frequency().is_valid() {
            return Err(ServiceError::config(format!(
                "max_frequency_hz must be positive, got {}",
                self.max_frequency_hz
            )));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Load server configuration from an optional YAML file plus environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: ServerConfig = load_layered(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            return Err(ServiceError::config("bind_address must not be empty"));
        }
        self.backend.validate()
    }

    /// Socket address string to bind
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl ClientConfig {
    /// Load client configuration from an optional YAML file plus environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: ClientConfig = load_layered(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ServiceError::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(ServiceError::config("port must be non-zero"));
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_secs == 0 {
            return Err(ServiceError::config("timeouts must be non-zero"));
        }
        Ok(())
    }

    /// gRPC endpoint URI
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
