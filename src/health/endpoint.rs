//! Resolved, validated endpoints.

use crate::config::endpoint::join_url;
use crate::config::{BodyEncoding, ConfigError, EndpointConfig, HttpMethod};
use std::collections::{BTreeMap, BTreeSet};

/// Credentialed request issued after the passive probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCheck {
    pub url: String,
    pub method: HttpMethod,
    pub expected_status: BTreeSet<u16>,
    pub encoding: BodyEncoding,
    /// Body field name -> credential variable name
    pub fields: BTreeMap<String, String>,
}

/// Shape of the checks run for an endpoint each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// Reachability probe only
    Passive,
    /// Reachability probe followed by an active check
    PassiveWithActiveCheck(ActiveCheck),
}

/// An endpoint ready to be probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub category: String,
    pub icon: String,
    pub url: String,
    pub method: HttpMethod,
    pub probe: ProbeKind,
}

impl Endpoint {
    /// Passive endpoint with default presentation fields.
    pub fn passive(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: "General".to_string(),
            icon: "🌐".to_string(),
            url: url.into(),
            method: HttpMethod::Get,
            probe: ProbeKind::Passive,
        }
    }

    /// Resolve a config entry against the default base URL.
    pub fn from_config(
        config: &EndpointConfig,
        default_base_url: &str,
    ) -> Result<Self, ConfigError> {
        if config.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "endpoints.name".to_string(),
                message: "name cannot be empty".to_string(),
            });
        }

        let url = config.target_url(default_base_url);
        validate_url(&config.name, &url)?;

        let probe = match &config.active {
            None => ProbeKind::Passive,
            Some(active) => {
                if active.expected_status.is_empty() {
                    return Err(ConfigError::Validation {
                        field: format!("endpoints[{}].active.expected_status", config.name),
                        message: "expected status set cannot be empty".to_string(),
                    });
                }
                if active.fields.is_empty() {
                    return Err(ConfigError::Validation {
                        field: format!("endpoints[{}].active.fields", config.name),
                        message: "active check needs at least one body field".to_string(),
                    });
                }
                if let Some((field, _)) = active.fields.iter().find(|(_, var)| var.trim().is_empty())
                {
                    return Err(ConfigError::Validation {
                        field: format!("endpoints[{}].active.fields.{}", config.name, field),
                        message: "environment variable name cannot be empty".to_string(),
                    });
                }

                let active_url = match &active.path {
                    Some(path) if config.url.is_none() => {
                        let base = config.base_url.as_deref().unwrap_or(default_base_url);
                        join_url(base, path)
                    }
                    _ => url.clone(),
                };
                validate_url(&config.name, &active_url)?;

                ProbeKind::PassiveWithActiveCheck(ActiveCheck {
                    url: active_url,
                    method: active.method.unwrap_or(config.method),
                    expected_status: active.expected_status.clone(),
                    encoding: active.encoding,
                    fields: active.fields.clone(),
                })
            }
        };

        Ok(Self {
            name: config.name.clone(),
            category: config.category.clone(),
            icon: config.icon.clone(),
            url,
            method: config.method,
            probe,
        })
    }

    /// Method used by the passive probe.
    ///
    /// Endpoints with an active check exercise their configured method there,
    /// so their reachability probe is a plain GET.
    pub fn passive_method(&self) -> HttpMethod {
        match self.probe {
            ProbeKind::Passive => self.method,
            ProbeKind::PassiveWithActiveCheck(_) => HttpMethod::Get,
        }
    }

    pub fn active_check(&self) -> Option<&ActiveCheck> {
        match &self.probe {
            ProbeKind::Passive => None,
            ProbeKind::PassiveWithActiveCheck(check) => Some(check),
        }
    }
}

fn validate_url(endpoint: &str, url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        endpoint: endpoint.to_string(),
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
