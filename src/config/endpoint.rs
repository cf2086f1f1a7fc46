//! Endpoint configuration

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// HTTP method used for a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// How the active check body is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`
    #[default]
    Form,
    /// `application/json`
    Json,
}

/// Active (credentialed) check attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCheckConfig {
    /// Status codes that count as a passing check
    pub expected_status: BTreeSet<u16>,
    #[serde(default)]
    pub encoding: BodyEncoding,
    /// Body field name -> environment variable holding its value
    pub fields: BTreeMap<String, String>,
    /// Method override; defaults to the endpoint method
    #[serde(default)]
    pub method: Option<HttpMethod>,
    /// Path override; defaults to the endpoint path
    #[serde(default)]
    pub path: Option<String>,
}

/// Static endpoint definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Per-endpoint base URL, takes precedence over `monitor.base_url`
    #[serde(default)]
    pub base_url: Option<String>,
    /// Fully-qualified URL, ignores both base URLs and `path`
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: Option<ActiveCheckConfig>,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_icon() -> String {
    "🌐".to_string()
}

impl EndpointConfig {
    /// Build a passive GET endpoint with default presentation fields.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            category: default_category(),
            icon: default_icon(),
            method: HttpMethod::Get,
            base_url: None,
            url: None,
            active: None,
        }
    }

    /// Target URL: explicit override, else `base + path`.
    pub fn target_url(&self, default_base_url: &str) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let base = self.base_url.as_deref().unwrap_or(default_base_url);
        join_url(base, &self.path)
    }
}

/// Join a base URL and a path with exactly one separating slash.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}
