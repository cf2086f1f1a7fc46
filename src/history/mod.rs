//! Rolling per-endpoint telemetry.
//!
//! The [`RollingStore`] owns every rolling window and log buffer, keyed by
//! endpoint name. Aggregates (mean latency, uptime) are recomputed from the
//! windows on every call.

mod config;
mod window;

pub use config::HistoryConfig;
pub use window::RollingWindow;

use crate::health::{Classification, RawOutcome, Severity};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Wall-clock format used for samples and log lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One retained log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub ts: String,
    pub level: Severity,
    pub message: String,
}

/// Trailing slices of an endpoint's history, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryView {
    pub logs: Vec<LogEntry>,
    pub latency: Vec<f64>,
    pub timestamps: Vec<String>,
    pub success: Vec<bool>,
    pub status_codes: Vec<u16>,
}

/// Windows for a single endpoint.
///
/// `latency`, `timestamps`, `success` and `status_codes` always have the same
/// length; `uptime` and `logs` have their own capacities.
#[derive(Debug, Clone)]
struct EndpointHistory {
    latency: RollingWindow<f64>,
    timestamps: RollingWindow<String>,
    success: RollingWindow<bool>,
    status_codes: RollingWindow<u16>,
    uptime: RollingWindow<bool>,
    logs: RollingWindow<LogEntry>,
    /// Probes recorded over the endpoint's lifetime, unaffected by eviction
    recorded: u64,
}

impl EndpointHistory {
    fn new(config: &HistoryConfig) -> Self {
        Self {
            latency: RollingWindow::new(config.latency_capacity),
            timestamps: RollingWindow::new(config.latency_capacity),
            success: RollingWindow::new(config.latency_capacity),
            status_codes: RollingWindow::new(config.latency_capacity),
            uptime: RollingWindow::new(config.uptime_capacity),
            logs: RollingWindow::new(config.log_capacity),
            recorded: 0,
        }
    }

    fn average(&self) -> f64 {
        if self.latency.is_empty() {
            return 0.0;
        }
        self.latency.iter().sum::<f64>() / self.latency.len() as f64
    }

    fn uptime(&self) -> f64 {
        if self.uptime.is_empty() {
            return 0.0;
        }
        let up = self.uptime.iter().filter(|ok| **ok).count();
        100.0 * up as f64 / self.uptime.len() as f64
    }
}

/// Process-wide rolling telemetry, shared by all cycles.
pub struct RollingStore {
    config: HistoryConfig,
    entries: DashMap<String, EndpointHistory>,
}

impl RollingStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record one probe, stamped with the current local time.
    pub fn record(&self, endpoint_id: &str, outcome: &RawOutcome, classification: &Classification) {
        let ts = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.record_at(endpoint_id, outcome, classification, ts);
    }

    /// Record one probe with an explicit timestamp.
    ///
    /// All windows of the endpoint are updated under its map shard lock.
    pub fn record_at(
        &self,
        endpoint_id: &str,
        outcome: &RawOutcome,
        classification: &Classification,
        ts: String,
    ) {
        let mut history = self
            .entries
            .entry(endpoint_id.to_string())
            .or_insert_with(|| EndpointHistory::new(&self.config));

        let success = classification.state.is_reachable();

        history.latency.push(outcome.elapsed_seconds);
        history.timestamps.push(ts.clone());
        history.success.push(success);
        history.status_codes.push(outcome.status_code);
        history.uptime.push(success);
        history.recorded += 1;
        history.logs.push(LogEntry {
            ts,
            level: classification.severity,
            message: classification.message.clone(),
        });
    }

    /// Mean of the latency window; `0.0` before the first sample.
    pub fn average(&self, endpoint_id: &str) -> f64 {
        self.entries
            .get(endpoint_id)
            .map(|h| h.average())
            .unwrap_or(0.0)
    }

    /// Percentage of successful probes in the uptime window; `0.0` when empty.
    pub fn uptime(&self, endpoint_id: &str) -> f64 {
        self.entries
            .get(endpoint_id)
            .map(|h| h.uptime())
            .unwrap_or(0.0)
    }

    /// Trailing `log_lines` log entries and `points` samples of each series.
    pub fn view(&self, endpoint_id: &str, log_lines: usize, points: usize) -> HistoryView {
        match self.entries.get(endpoint_id) {
            Some(h) => HistoryView {
                logs: h.logs.tail(log_lines),
                latency: h.latency.tail(points),
                timestamps: h.timestamps.tail(points),
                success: h.success.tail(points),
                status_codes: h.status_codes.tail(points),
            },
            None => HistoryView::default(),
        }
    }

    /// Number of samples in the latency window.
    pub fn sample_count(&self, endpoint_id: &str) -> usize {
        self.entries
            .get(endpoint_id)
            .map(|h| h.latency.len())
            .unwrap_or(0)
    }

    /// Total probes recorded for an endpoint, including evicted ones.
    pub fn recorded(&self, endpoint_id: &str) -> u64 {
        self.entries
            .get(endpoint_id)
            .map(|h| h.recorded)
            .unwrap_or(0)
    }

    /// Success flag of the most recent probe, if any.
    pub fn last_success(&self, endpoint_id: &str) -> Option<bool> {
        self.entries
            .get(endpoint_id)
            .and_then(|h| h.success.latest().copied())
    }

    /// Number of endpoints with recorded history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Endpoint names with recorded history, sorted.
    pub fn endpoint_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

impl Default for RollingStore {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

/// Largest rounding precision accepted for `history.decimals`.
pub const MAX_DECIMALS: u32 = 9;

/// Round to `decimals` places, capped at [`MAX_DECIMALS`].
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Classifier, ClassifierStrategy, HealthState, ProbeError};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn classifier() -> Classifier {
        Classifier::new(ClassifierStrategy::LatencyAware, 1.0)
    }

    fn record(store: &RollingStore, id: &str, outcome: RawOutcome) {
        let classification = classifier().classify(&outcome);
        store.record(id, &outcome, &classification);
    }

    fn small_config() -> HistoryConfig {
        HistoryConfig {
            latency_capacity: 3,
            uptime_capacity: 5,
            log_capacity: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_history_config_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.latency_capacity, 60);
        assert_eq!(config.uptime_capacity, 200);
        assert_eq!(config.log_capacity, 30);
        assert_eq!(config.snapshot_log_lines, 6);
        assert_eq!(config.decimals, 2);
    }

    #[test]
    fn test_unknown_endpoint_aggregates_are_zero() {
        let store = RollingStore::default();
        assert_eq!(store.average("missing"), 0.0);
        assert_eq!(store.uptime("missing"), 0.0);
        assert_eq!(store.view("missing", 6, 60), HistoryView::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_average_is_mean_of_window() {
        let store = RollingStore::new(small_config());
        for latency in [0.2, 0.4, 0.6, 0.8] {
            record(&store, "api", RawOutcome::response(200, latency));
        }
        // Window holds the last three: 0.4, 0.6, 0.8
        assert!((store.average("api") - 0.6).abs() < 1e-9);
        assert_eq!(store.sample_count("api"), 3);
    }

    #[test]
    fn test_recorded_counts_past_eviction() {
        let store = RollingStore::new(small_config());
        assert_eq!(store.recorded("api"), 0);
        for _ in 0..5 {
            record(&store, "api", RawOutcome::response(200, 0.1));
        }
        assert_eq!(store.sample_count("api"), 3);
        assert_eq!(store.recorded("api"), 5);
    }

    #[test]
    fn test_uptime_uses_independent_window() {
        let store = RollingStore::new(small_config());
        record(&store, "api", RawOutcome::response(200, 0.1));
        record(&store, "api", RawOutcome::response(503, 0.1));
        record(&store, "api", RawOutcome::response(200, 0.1));
        record(&store, "api", RawOutcome::failed(ProbeError::Timeout(5), 5.0));
        // 2 of 4 reachable
        assert_eq!(store.uptime("api"), 50.0);

        // Latency window (capacity 3) has already evicted; uptime (5) has not
        assert_eq!(store.view("api", 10, 10).success.len(), 3);
    }

    #[test]
    fn test_last_success_tracks_latest_probe() {
        let store = RollingStore::default();
        assert_eq!(store.last_success("api"), None);
        record(&store, "api", RawOutcome::response(200, 0.1));
        assert_eq!(store.last_success("api"), Some(true));
        record(&store, "api", RawOutcome::response(500, 0.1));
        assert_eq!(store.last_success("api"), Some(false));
    }

    #[test]
    fn test_redirect_and_degraded_count_as_up() {
        let store = RollingStore::default();
        record(&store, "api", RawOutcome::response(302, 0.1));
        record(&store, "api", RawOutcome::response(200, 4.0));
        assert_eq!(store.uptime("api"), 100.0);
    }

    #[test]
    fn test_record_keeps_series_synchronized() {
        let store = RollingStore::new(small_config());
        for i in 0..7 {
            record(&store, "api", RawOutcome::response(200 + i, 0.1));
        }
        let view = store.view("api", 100, 100);
        assert_eq!(view.latency.len(), 3);
        assert_eq!(view.timestamps.len(), 3);
        assert_eq!(view.success.len(), 3);
        assert_eq!(view.status_codes, vec![204, 205, 206]);
    }

    #[test]
    fn test_transport_failure_records_zero_status() {
        let store = RollingStore::default();
        record(
            &store,
            "api",
            RawOutcome::failed(ProbeError::ConnectionFailed("refused".into()), 0.002),
        );
        let view = store.view("api", 6, 60);
        assert_eq!(view.status_codes, vec![0]);
        assert_eq!(view.success, vec![false]);
        assert_eq!(view.logs[0].level, Severity::Error);
        assert!(view.logs[0].message.starts_with("connection:"));
    }

    #[test]
    fn test_logs_are_bounded() {
        let store = RollingStore::new(small_config());
        record(&store, "api", RawOutcome::response(200, 0.1));
        record(&store, "api", RawOutcome::response(500, 0.1));
        record(&store, "api", RawOutcome::response(302, 0.1));
        let view = store.view("api", 10, 10);
        assert_eq!(view.logs.len(), 2);
        assert_eq!(view.logs[0].level, Severity::Error);
        assert_eq!(view.logs[1].level, Severity::Warn);
    }

    #[test]
    fn test_record_at_uses_given_timestamp() {
        let store = RollingStore::default();
        let outcome = RawOutcome::response(200, 0.1);
        let classification = classifier().classify(&outcome);
        store.record_at("api", &outcome, &classification, "2024-01-01 00:00:00".into());
        let view = store.view("api", 1, 1);
        assert_eq!(view.timestamps, vec!["2024-01-01 00:00:00".to_string()]);
        assert_eq!(view.logs[0].ts, "2024-01-01 00:00:00");
    }

    #[test]
    fn test_endpoints_are_isolated() {
        let store = RollingStore::default();
        record(&store, "a", RawOutcome::response(200, 0.1));
        record(&store, "b", RawOutcome::response(500, 0.1));
        assert_eq!(store.uptime("a"), 100.0);
        assert_eq!(store.uptime("b"), 0.0);
        assert_eq!(store.endpoint_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_concurrent_records_for_distinct_endpoints() {
        let store = Arc::new(RollingStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        record(&store, &format!("ep-{}", i), RawOutcome::response(200, 0.1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8);
        for i in 0..8 {
            assert_eq!(store.sample_count(&format!("ep-{}", i)), 50);
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 2), 0.12);
        assert_eq!(round_to(99.995, 1), 100.0);
        assert_eq!(round_to(1.5, 0), 2.0);
    }

    #[test]
    fn test_round_to_caps_precision() {
        let rounded = round_to(0.25, 400);
        assert!(rounded.is_finite());
        assert_eq!(rounded, 0.25);
        assert_eq!(round_to(0.25, u32::MAX), 0.25);
        assert_eq!(serde_json::to_string(&rounded).unwrap(), "0.25");
    }

    #[test]
    fn test_classification_state_drives_success_flag() {
        let store = RollingStore::default();
        let outcome = RawOutcome::response(200, 0.1);
        let forced = Classification {
            state: HealthState::Offline,
            severity: Severity::Error,
            message: "forced".into(),
        };
        store.record("api", &outcome, &forced);
        assert_eq!(store.uptime("api"), 0.0);
    }

    proptest! {
        #[test]
        fn prop_uptime_within_bounds(statuses in proptest::collection::vec(100u16..600, 1..300)) {
            let store = RollingStore::default();
            for status in &statuses {
                record(&store, "api", RawOutcome::response(*status, 0.1));
            }
            let uptime = store.uptime("api");
            prop_assert!((0.0..=100.0).contains(&uptime));
        }

        #[test]
        fn prop_average_matches_window_mean(
            latencies in proptest::collection::vec(0.0f64..10.0, 1..150),
        ) {
            let store = RollingStore::default();
            for latency in &latencies {
                record(&store, "api", RawOutcome::response(200, *latency));
            }
            let capacity = store.config().latency_capacity;
            let skip = latencies.len().saturating_sub(capacity);
            let window = &latencies[skip..];
            let expected = window.iter().sum::<f64>() / window.len() as f64;
            prop_assert!((store.average("api") - expected).abs() < 1e-9);
        }
    }
}
