//! Gateway configuration module
//!
//! Provides [`GatewayConfig`], its builder and the TOML file representation.
//! Reading the file and the environment happens in
//! `backend::server::config::load_config`; this module only knows how to
//! layer values and validate the result.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

/// Default maximum heartbeat age for a backend to count as alive
pub const DEFAULT_LIVENESS_THRESHOLD: Duration = Duration::from_secs(10);

/// Default timeout of a single backend call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default period between reconciliation rounds
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(30);

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to
    pub listen: String,
    /// PostgreSQL connection string; the in-memory store is used without it
    pub database_url: Option<String>,
    /// Maximum heartbeat age for a backend to count as alive
    pub liveness_threshold: Duration,
    /// Timeout of a single backend call
    pub request_timeout: Duration,
    /// Period between reconciliation rounds
    pub reconcile_interval: Duration,
    /// Whether newly registered backends start administratively enabled
    pub enable_on_register: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            database_url: None,
            liveness_threshold: DEFAULT_LIVENESS_THRESHOLD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            enable_on_register: false,
        }
    }
}

impl GatewayConfig {
    /// Create a new GatewayConfigBuilder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }

        for (key, value) in [
            ("liveness_threshold", self.liveness_threshold),
            ("request_timeout", self.request_timeout),
            ("reconcile_interval", self.reconcile_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(self.listen.clone()))
    }
}

/// TOML configuration file
///
/// ```toml
/// listen = "127.0.0.1:8080"
/// database_url = "postgres://bbbgate@localhost/bbbgate"
/// liveness_secs = 10
/// request_timeout_secs = 5
/// reconcile_interval_secs = 30
/// enable_on_register = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub database_url: Option<String>,
    pub liveness_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub reconcile_interval_secs: Option<u64>,
    pub enable_on_register: Option<bool>,
}

impl ConfigFile {
    /// Parse the TOML text of a configuration file
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Builder for GatewayConfig
///
/// Unset values fall back to the defaults.
#[derive(Debug, Default, Clone)]
pub struct GatewayConfigBuilder {
    listen: Option<String>,
    database_url: Option<String>,
    liveness_threshold: Option<Duration>,
    request_timeout: Option<Duration>,
    reconcile_interval: Option<Duration>,
    enable_on_register: Option<bool>,
}

impl GatewayConfigBuilder {
    /// Set the listen address
    pub fn listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = Some(listen.into());
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the liveness threshold
    pub fn liveness_threshold(mut self, threshold: Duration) -> Self {
        self.liveness_threshold = Some(threshold);
        self
    }

    /// Set the backend request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the reconciliation interval
    pub fn reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = Some(interval);
        self
    }

    /// Set the registration policy
    pub fn enable_on_register(mut self, enable: bool) -> Self {
        self.enable_on_register = Some(enable);
        self
    }

    /// Layer the values present in a configuration file over this builder
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(listen) = file.listen {
            self.listen = Some(listen);
        }
        if let Some(url) = file.database_url {
            self.database_url = Some(url);
        }
        if let Some(secs) = file.liveness_secs {
            self.liveness_threshold = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = file.reconcile_interval_secs {
            self.reconcile_interval = Some(Duration::from_secs(secs));
        }
        if let Some(enable) = file.enable_on_register {
            self.enable_on_register = Some(enable);
        }
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        let defaults = GatewayConfig::default();
        let config = GatewayConfig {
            listen: self.listen.unwrap_or(defaults.listen),
            database_url: self.database_url.filter(|url| !url.is_empty()),
            liveness_threshold: self.liveness_threshold.unwrap_or(defaults.liveness_threshold),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            reconcile_interval: self.reconcile_interval.unwrap_or(defaults.reconcile_interval),
            enable_on_register: self.enable_on_register.unwrap_or(defaults.enable_on_register),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid listen address: {0}")]
    InvalidListen(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
