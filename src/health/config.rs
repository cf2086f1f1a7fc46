//! Configuration for endpoint probing.

use super::classifier::ClassifierStrategy;
use serde::{Deserialize, Serialize};

/// Probe and cycle settings shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Default base URL joined with each endpoint path
    pub base_url: String,
    /// Hard timeout for each probe request
    pub timeout_seconds: u64,
    /// Latency above which a 2xx answer is reported as Degraded
    pub latency_threshold_seconds: f64,
    /// Which classification rule set to apply
    pub classifier: ClassifierStrategy,
    /// Maximum number of endpoints probed at the same time
    pub worker_cap: usize,
    /// Follow 3xx responses; disable to observe Redirect states
    pub follow_redirects: bool,
    /// Run cycles on a timer in addition to on-demand requests
    pub poll_in_background: bool,
    /// Seconds between background cycles
    pub interval_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 5,
            latency_threshold_seconds: 1.0,
            classifier: ClassifierStrategy::LatencyAware,
            worker_cap: 8,
            follow_redirects: true,
            poll_in_background: false,
            interval_seconds: 30,
        }
    }
}
