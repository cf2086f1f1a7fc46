//! Probe outcome classification.
//!
//! Maps a raw outcome to a [`HealthState`], a log [`Severity`] and the log
//! message recorded for the probe. Classification is stateless: every cycle
//! is judged on its own outcome.

use super::state::RawOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a single log message, in characters.
pub const MAX_LOG_MESSAGE_CHARS: usize = 120;

/// Health of an endpoint as observed by one passive probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Online,
    Degraded,
    Redirect,
    Offline,
}

impl HealthState {
    /// Whether the endpoint answered with a non-error status.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, HealthState::Offline)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Online => "Online",
            HealthState::Degraded => "Degraded",
            HealthState::Redirect => "Redirect",
            HealthState::Offline => "Offline",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of the log line written for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        })
    }
}

/// Rule set used to classify successful (2xx) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Slow 2xx responses are `Degraded`
    #[default]
    LatencyAware,
    /// Only the status class matters; any 2xx is `Online`
    StatusOnly,
}

impl FromStr for ClassifierStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "latency_aware" => Ok(ClassifierStrategy::LatencyAware),
            "status_only" => Ok(ClassifierStrategy::StatusOnly),
            _ => Err(format!("Invalid classifier strategy: {}", s)),
        }
    }
}

impl ClassifierStrategy {
    /// Classify one probe outcome under this rule set.
    pub fn classify(
        self,
        status_code: u16,
        elapsed_seconds: f64,
        transport_error: bool,
        latency_threshold: f64,
    ) -> (HealthState, Severity) {
        if transport_error {
            return (HealthState::Offline, Severity::Error);
        }

        match status_code {
            200..=299 => match self {
                ClassifierStrategy::LatencyAware if elapsed_seconds > latency_threshold => {
                    (HealthState::Degraded, Severity::Warn)
                }
                _ => (HealthState::Online, Severity::Info),
            },
            300..=399 => (HealthState::Redirect, Severity::Warn),
            _ => (HealthState::Offline, Severity::Error),
        }
    }
}

/// Classify with the latency-aware rule set.
pub fn classify(
    status_code: u16,
    elapsed_seconds: f64,
    transport_error: bool,
    latency_threshold: f64,
) -> (HealthState, Severity) {
    ClassifierStrategy::LatencyAware.classify(
        status_code,
        elapsed_seconds,
        transport_error,
        latency_threshold,
    )
}

/// Result of classifying a probe: state, severity and the log message.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub state: HealthState,
    pub severity: Severity,
    pub message: String,
}

/// Configured classifier applied to every passive probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    strategy: ClassifierStrategy,
    latency_threshold: f64,
}

impl Classifier {
    pub fn new(strategy: ClassifierStrategy, latency_threshold: f64) -> Self {
        Self {
            strategy,
            latency_threshold,
        }
    }

    pub fn strategy(&self) -> ClassifierStrategy {
        self.strategy
    }

    pub fn latency_threshold(&self) -> f64 {
        self.latency_threshold
    }

    /// Classify an outcome and render its log message.
    pub fn classify(&self, outcome: &RawOutcome) -> Classification {
        let (state, severity) = self.strategy.classify(
            outcome.status_code,
            outcome.elapsed_seconds,
            outcome.transport_error.is_some(),
            self.latency_threshold,
        );

        let message = match (&outcome.transport_error, state) {
            (Some(error), _) => format!("{}: {}", error.category(), error),
            (None, HealthState::Online) => format!(
                "Health check passed (HTTP {} in {:.2}s).",
                outcome.status_code, outcome.elapsed_seconds
            ),
            (None, HealthState::Degraded) => format!(
                "Latency above threshold: {:.2}s > {:.2}s (HTTP {}).",
                outcome.elapsed_seconds, self.latency_threshold, outcome.status_code
            ),
            (None, HealthState::Redirect) => {
                format!("Redirect response (HTTP {}).", outcome.status_code)
            }
            (None, HealthState::Offline) => {
                format!("Unhealthy response (HTTP {}).", outcome.status_code)
            }
        };

        Classification {
            state,
            severity,
            message: truncate_message(&message, MAX_LOG_MESSAGE_CHARS),
        }
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
