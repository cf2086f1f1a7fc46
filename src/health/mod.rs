//! Endpoint probing and health classification.
//!
//! A [`ProbeExecutor`] issues the passive reachability probe for an endpoint
//! and, when the endpoint declares one, the credentialed active check. Every
//! probe is total: transport failures come back as a sentinel outcome rather
//! than an error.

mod classifier;
mod config;
mod credentials;
mod endpoint;
mod error;
mod state;


pub use classifier::*;
pub use config::*;
pub use credentials::*;
pub use endpoint::*;
pub use error::*;
pub use state::*;

use crate::config::BodyEncoding;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Issues probes for endpoints and classifies the passive outcome.
pub struct ProbeExecutor {
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Per-request timeout
    timeout_seconds: u64,
    classifier: Classifier,
    /// Where active check credentials come from
    credentials: Arc<dyn CredentialSource>,
}

impl ProbeExecutor {
    /// Create an executor with an HTTP client built from the config.
    pub fn new(config: &MonitorConfig) -> Result<Self, reqwest::Error> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(redirect)
            .user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(config, client))
    }

    /// Create an executor with a custom HTTP client (for testing).
    pub fn with_client(config: &MonitorConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            timeout_seconds: config.timeout_seconds,
            classifier: Classifier::new(config.classifier, config.latency_threshold_seconds),
            credentials: Arc::new(EnvCredentials),
        }
    }

    /// Replace the credential source.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Issue the passive reachability probe.
    pub async fn probe(&self, endpoint: &Endpoint) -> RawOutcome {
        let start = Instant::now();
        let result = self
            .client
            .request(endpoint.passive_method().into(), &endpoint.url)
            .timeout(self.timeout())
            .send()
            .await;
        let elapsed_seconds = start.elapsed().as_secs_f64();

        metrics::histogram!("vigil_probe_latency_seconds",
            "endpoint" => endpoint.name.clone()
        )
        .record(elapsed_seconds);

        match result {
            Ok(response) => {
                let status_code = response.status().as_u16();
                tracing::debug!(
                    endpoint = %endpoint.name,
                    status_code,
                    elapsed_seconds,
                    "Probe completed"
                );
                RawOutcome::response(status_code, elapsed_seconds)
            }
            Err(e) => {
                let error = ProbeError::from_reqwest(&e, self.timeout_seconds);
                tracing::warn!(
                    endpoint = %endpoint.name,
                    url = %endpoint.url,
                    error = %error,
                    "Probe failed"
                );
                RawOutcome::failed(error, elapsed_seconds)
            }
        }
    }

    /// Run the active check, or report it `Idle` when credentials are missing.
    pub async fn active_check(&self, endpoint: &str, check: &ActiveCheck) -> ActiveOutcome {
        let body = match resolve_fields(&check.fields, self.credentials.as_ref()) {
            Ok(body) => body,
            Err(missing) => {
                tracing::debug!(
                    endpoint = %endpoint,
                    missing = ?missing,
                    "Active check skipped, credentials not configured"
                );
                return ActiveOutcome {
                    state: ActivityState::Idle,
                    note: truncate_message(
                        &format!("Skipped: missing credentials {}", missing.join(", ")),
                        MAX_LOG_MESSAGE_CHARS,
                    ),
                    method: check.method,
                    status_code: None,
                };
            }
        };

        let request = self
            .client
            .request(check.method.into(), &check.url)
            .timeout(self.timeout());
        let request = match check.encoding {
            BodyEncoding::Form => request.form(&body),
            BodyEncoding::Json => request.json(&body),
        };

        match request.send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                let (state, note) = if check.expected_status.contains(&status_code) {
                    (
                        ActivityState::Passing,
                        format!("{} accepted with HTTP {}", check.method, status_code),
                    )
                } else {
                    let expected: Vec<String> =
                        check.expected_status.iter().map(u16::to_string).collect();
                    (
                        ActivityState::Failing,
                        format!(
                            "{} returned HTTP {}, expected one of [{}]",
                            check.method,
                            status_code,
                            expected.join(", ")
                        ),
                    )
                };
                ActiveOutcome {
                    state,
                    note: truncate_message(&note, MAX_LOG_MESSAGE_CHARS),
                    method: check.method,
                    status_code: Some(status_code),
                }
            }
            Err(e) => {
                let error = ProbeError::from_reqwest(&e, self.timeout_seconds);
                tracing::warn!(
                    endpoint = %endpoint,
                    error = %error,
                    "Active check failed"
                );
                ActiveOutcome {
                    state: ActivityState::Failing,
                    note: truncate_message(
                        &format!("{} failed: {}: {}", check.method, error.category(), error),
                        MAX_LOG_MESSAGE_CHARS,
                    ),
                    method: check.method,
                    status_code: None,
                }
            }
        }
    }

    /// Passive probe, then the active check if the endpoint has one.
    pub async fn check_endpoint(&self, endpoint: &Endpoint) -> ProbeReport {
        let outcome = self.probe(endpoint).await;

        let active = match &endpoint.probe {
            ProbeKind::Passive => None,
            ProbeKind::PassiveWithActiveCheck(check) => {
                Some(self.active_check(&endpoint.name, check).await)
            }
        };

        let last_method = match &active {
            Some(active) if active.state != ActivityState::Idle => active.method,
            _ => endpoint.passive_method(),
        };

        ProbeReport {
            outcome,
            active,
            last_method,
        }
    }
}
