//! Error types for endpoint probing.

use thiserror::Error;

/// Transport-level failures captured while probing an endpoint.
///
/// These never escape the probe executor; they are folded into an
/// `Offline` classification and a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Request timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// Connection failed (refused, reset, TLS handshake)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other request failure
    #[error("request failed: {0}")]
    Request(String),
}

impl ProbeError {
    /// Short category label used as the log line prefix.
    pub fn category(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Dns(_) => "dns",
            ProbeError::ConnectionFailed(_) => "connection",
            ProbeError::Request(_) => "request",
        }
    }

    /// Classify a reqwest error.
    pub fn from_reqwest(e: &reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            return ProbeError::Timeout(timeout_seconds);
        }

        let detail = root_cause(e);
        if e.is_connect() {
            let lowered = detail.to_lowercase();
            if lowered.contains("dns")
                || lowered.contains("resolve")
                || lowered.contains("lookup")
                || lowered.contains("name or service not known")
            {
                ProbeError::Dns(detail)
            } else {
                ProbeError::ConnectionFailed(detail)
            }
        } else {
            ProbeError::Request(detail)
        }
    }
}

/// Innermost message of an error chain; reqwest's top-level message only
/// names the URL.
fn root_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut current = e;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
