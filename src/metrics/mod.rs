//! # Metrics Collection Module
//!
//! Prometheus export of probe and cycle telemetry.
//!
//! ## Overview
//!
//! This module exposes one endpoint:
//! - `GET /metrics` - Prometheus text format metrics
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `vigil_probes_total{endpoint, status}` - Passive probes by health state
//! - `vigil_active_checks_total{endpoint, activity}` - Active checks by result
//!
//! **Histograms:**
//! - `vigil_probe_latency_seconds{endpoint}` - Passive probe latency
//! - `vigil_cycle_duration_seconds` - Wall time of one full cycle
//!
//! **Gauges:**
//! - `vigil_endpoints_total` - Endpoints checked in the last cycle
//! - `vigil_endpoints_online` - Endpoints `Online` in the last cycle
//! - `vigil_endpoint_uptime_percent{endpoint}` - Rolling uptime
//! - `vigil_endpoint_average_latency_seconds{endpoint}` - Rolling mean latency

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::history::RollingStore;
use std::sync::Arc;
use std::time::Instant;

/// Histogram buckets for probe latency and cycle duration, in seconds.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Derives gauges from the rolling store and renders the exposition text.
pub struct MetricsCollector {
    /// Rolling history the per-endpoint gauges are computed from
    store: Arc<RollingStore>,
    /// Server startup time for uptime calculation
    start_time: Instant,
    /// Prometheus handle for rendering metrics
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        store: Arc<RollingStore>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            store,
            start_time,
            prometheus_handle,
        }
    }

    /// Update per-endpoint gauges from the rolling store.
    ///
    /// Endpoints that have never been probed have no history and are skipped.
    pub fn update_store_gauges(&self) {
        for endpoint in self.store.endpoint_ids() {
            metrics::gauge!("vigil_endpoint_uptime_percent", "endpoint" => endpoint.clone())
                .set(self.store.uptime(&endpoint));
            metrics::gauge!("vigil_endpoint_average_latency_seconds", "endpoint" => endpoint.clone())
                .set(self.store.average(&endpoint));
        }
    }

    /// Get uptime in seconds since server startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn store(&self) -> &Arc<RollingStore> {
        &self.store
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Initialize Prometheus metrics exporter with custom histogram buckets.
///
/// Returns a PrometheusHandle that can be used to render metrics. Fails if a
/// global recorder is already installed.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("vigil_probe_latency_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("vigil_cycle_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Classification, HealthState, RawOutcome, Severity};
    use crate::history::HistoryConfig;

    fn online() -> Classification {
        Classification {
            state: HealthState::Online,
            severity: Severity::Info,
            message: "ok".to_string(),
        }
    }

    #[test]
    fn test_metrics_collector_construction() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let store = Arc::new(RollingStore::new(HistoryConfig::default()));
        let collector = MetricsCollector::new(store, Instant::now(), recorder.handle());

        assert!(collector.uptime_seconds() < 1); // Should be very small
        assert!(collector.store().is_empty());
    }

    #[test]
    fn test_update_store_gauges_renders_per_endpoint_values() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let store = Arc::new(RollingStore::new(HistoryConfig::default()));
        store.record("User Service", &RawOutcome::response(200, 0.5), &online());

        let collector = MetricsCollector::new(Arc::clone(&store), Instant::now(), recorder.handle());
        metrics::with_local_recorder(&recorder, || collector.update_store_gauges());

        let rendered = collector.render_metrics();
        assert!(rendered.contains("vigil_endpoint_uptime_percent"));
        assert!(rendered.contains("endpoint=\"User Service\""));
        assert!(rendered.contains("vigil_endpoint_average_latency_seconds"));
    }

    #[test]
    fn test_update_store_gauges_empty_store_renders_nothing() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let store = Arc::new(RollingStore::default());
        let collector = MetricsCollector::new(store, Instant::now(), recorder.handle());

        metrics::with_local_recorder(&recorder, || collector.update_store_gauges());
        assert!(!collector
            .render_metrics()
            .contains("vigil_endpoint_uptime_percent"));
    }
}
