//! Configuration module for Vigil
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`VIGIL_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use vigil::config::VigilConfig;
//!
//! let toml = r#"
//! [monitor]
//! base_url = "https://api.example.com"
//!
//! [[endpoints]]
//! name = "User Service"
//! path = "/users/health"
//! "#;
//! let config: VigilConfig = toml::from_str(toml).unwrap();
//! let endpoints = config.resolve_endpoints().unwrap();
//! assert_eq!(endpoints[0].url, "https://api.example.com/users/health");
//! ```

pub mod endpoint;
pub mod error;
pub mod logging;
pub mod server;

pub use endpoint::{ActiveCheckConfig, BodyEncoding, EndpointConfig, HttpMethod};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

// Section configs owned by their modules
pub use crate::health::{ClassifierStrategy, MonitorConfig};
pub use crate::history::HistoryConfig;

use crate::health::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Unified configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Probe and cycle settings
    pub monitor: MonitorConfig,
    /// Rolling history retention
    pub history: HistoryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Static endpoint definitions
    pub endpoints: Vec<EndpointConfig>,
}

impl VigilConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports VIGIL_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Server settings
        if let Ok(port) = std::env::var("VIGIL_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("VIGIL_HOST") {
            self.server.host = host;
        }

        // Monitor settings
        if let Ok(base_url) = std::env::var("VIGIL_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.monitor.base_url = base_url;
            }
        }
        if let Ok(timeout) = std::env::var("VIGIL_TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse() {
                self.monitor.timeout_seconds = t;
            }
        }
        if let Ok(threshold) = std::env::var("VIGIL_LATENCY_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.monitor.latency_threshold_seconds = t;
            }
        }
        if let Ok(cap) = std::env::var("VIGIL_WORKER_CAP") {
            if let Ok(c) = cap.parse() {
                self.monitor.worker_cap = c;
            }
        }
        if let Ok(strategy) = std::env::var("VIGIL_CLASSIFIER") {
            if let Ok(s) = strategy.parse() {
                self.monitor.classifier = s;
            }
        }

        // Logging settings
        if let Ok(level) = std::env::var("VIGIL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VIGIL_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "server.request_timeout_seconds".to_string(),
                message: "request timeout must be at least one second".to_string(),
            });
        }

        if self.monitor.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "monitor.timeout_seconds".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        let threshold = self.monitor.latency_threshold_seconds;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::Validation {
                field: "monitor.latency_threshold_seconds".to_string(),
                message: format!("threshold must be a positive number, got {}", threshold),
            });
        }
        if self.monitor.worker_cap == 0 {
            return Err(ConfigError::Validation {
                field: "monitor.worker_cap".to_string(),
                message: "worker cap must be non-zero".to_string(),
            });
        }

        for (field, value) in [
            ("history.latency_capacity", self.history.latency_capacity),
            ("history.uptime_capacity", self.history.uptime_capacity),
            ("history.log_capacity", self.history.log_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "capacity must be non-zero".to_string(),
                });
            }
        }

        if self.history.decimals > crate::history::MAX_DECIMALS {
            return Err(ConfigError::Validation {
                field: "history.decimals".to_string(),
                message: format!(
                    "decimals must be at most {}, got {}",
                    crate::history::MAX_DECIMALS,
                    self.history.decimals
                ),
            });
        }

        self.resolve_endpoints()?;
        Ok(())
    }

    /// Resolve every endpoint against the default base URL.
    ///
    /// Endpoint names are the rolling-history key, so duplicates are rejected.
    pub fn resolve_endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut endpoints = Vec::with_capacity(self.endpoints.len());

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if let Some(first) = seen.insert(endpoint.name.as_str(), i) {
                return Err(ConfigError::DuplicateEndpoint {
                    name: endpoint.name.clone(),
                    first,
                    second: i,
                });
            }
            endpoints.push(Endpoint::from_config(endpoint, &self.monitor.base_url)?);
        }

        Ok(endpoints)
    }
}
