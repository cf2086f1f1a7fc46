//! Per-endpoint status snapshot returned by a cycle.

use crate::config::HttpMethod;
use crate::health::{ActivityState, Endpoint, HealthState, ProbeReport};
use crate::history::{round_to, LogEntry, RollingStore};
use serde::{Deserialize, Serialize};

/// One endpoint's status for one cycle.
///
/// Latencies are in seconds and uptime is a 0-100 percentage, all rounded to
/// the configured number of decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub icon: String,
    pub category: String,
    pub url: String,
    pub status: HealthState,
    pub status_code: u16,
    pub response_time: f64,
    pub average: f64,
    pub uptime: f64,
    pub logs: Vec<LogEntry>,
    pub latency_history: Vec<f64>,
    pub timestamps: Vec<String>,
    pub success_history: Vec<bool>,
    pub status_codes: Vec<u16>,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_note: Option<String>,
}

impl StatusSnapshot {
    /// Combine a probe report with the endpoint's current rolling history.
    pub fn build(
        endpoint: &Endpoint,
        status: HealthState,
        report: &ProbeReport,
        store: &RollingStore,
    ) -> Self {
        let config = store.config();
        let decimals = config.decimals;
        let view = store.view(
            &endpoint.name,
            config.snapshot_log_lines,
            config.snapshot_history_points,
        );

        Self {
            name: endpoint.name.clone(),
            icon: endpoint.icon.clone(),
            category: endpoint.category.clone(),
            url: endpoint.url.clone(),
            status,
            status_code: report.outcome.status_code,
            response_time: round_to(report.outcome.elapsed_seconds, decimals),
            average: round_to(store.average(&endpoint.name), decimals),
            uptime: round_to(store.uptime(&endpoint.name), decimals),
            logs: view.logs,
            latency_history: view
                .latency
                .into_iter()
                .map(|latency| round_to(latency, decimals))
                .collect(),
            timestamps: view.timestamps,
            success_history: view.success,
            status_codes: view.status_codes,
            method: report.last_method,
            activity: report.active.as_ref().map(|a| a.state),
            activity_note: report.active.as_ref().map(|a| a.note.clone()),
        }
    }
}
