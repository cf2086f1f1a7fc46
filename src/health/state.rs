//! Raw probe outcomes and active check results.

use super::error::ProbeError;
use crate::config::HttpMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a single passive probe observed.
///
/// `status_code` is `0` whenever `transport_error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutcome {
    pub status_code: u16,
    pub elapsed_seconds: f64,
    pub transport_error: Option<ProbeError>,
}

impl RawOutcome {
    /// The endpoint answered with an HTTP status.
    pub fn response(status_code: u16, elapsed_seconds: f64) -> Self {
        Self {
            status_code,
            elapsed_seconds,
            transport_error: None,
        }
    }

    /// The request never produced a response.
    pub fn failed(error: ProbeError, elapsed_seconds: f64) -> Self {
        Self {
            status_code: 0,
            elapsed_seconds,
            transport_error: Some(error),
        }
    }

    pub fn is_transport_error(&self) -> bool {
        self.transport_error.is_some()
    }
}

/// State of an endpoint's active (credentialed) check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityState {
    /// Not attempted: credentials are not configured
    Idle,
    /// Response status was in the expected set
    Passing,
    /// Unexpected status or transport failure
    Failing,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivityState::Idle => "Idle",
            ActivityState::Passing => "Passing",
            ActivityState::Failing => "Failing",
        })
    }
}

/// Result of an active check.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOutcome {
    pub state: ActivityState,
    pub note: String,
    /// Method of the active request, issued or skipped
    pub method: HttpMethod,
    /// Response status, if a response was received
    pub status_code: Option<u16>,
}

/// Everything one endpoint task learned in a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub outcome: RawOutcome,
    pub active: Option<ActiveOutcome>,
    /// Method of the last request actually sent
    pub last_method: HttpMethod,
}
