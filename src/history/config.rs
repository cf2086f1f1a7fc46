//! Configuration for rolling history retention.

use serde::{Deserialize, Serialize};

/// Window capacities and snapshot slice sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Capacity of the latency, timestamp, success and status-code windows
    pub latency_capacity: usize,
    /// Capacity of the independent window behind the uptime percentage
    pub uptime_capacity: usize,
    /// Log lines retained per endpoint
    pub log_capacity: usize,
    /// Trailing log lines included in each snapshot
    pub snapshot_log_lines: usize,
    /// Trailing samples of each history series included in each snapshot
    pub snapshot_history_points: usize,
    /// Decimal places for latency and uptime figures in snapshots
    pub decimals: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            latency_capacity: 60,
            uptime_capacity: 200,
            log_capacity: 30,
            snapshot_log_lines: 6,
            snapshot_history_points: 60,
            decimals: 2,
        }
    }
}
