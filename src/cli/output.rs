//! Output formatting helpers for CLI commands

use crate::config::HttpMethod;
use crate::health::{ActivityState, Endpoint, HealthState, ProbeKind};
use crate::scheduler::StatusSnapshot;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for endpoint display
#[derive(Debug, Clone, serde::Serialize)]
pub struct EndpointView {
    pub name: String,
    pub category: String,
    pub method: HttpMethod,
    pub url: String,
    /// `passive` or `active`
    pub probe: String,
    /// Active check target, when it differs from `url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_url: Option<String>,
}

impl From<&Endpoint> for EndpointView {
    fn from(endpoint: &Endpoint) -> Self {
        let (probe, active_url) = match &endpoint.probe {
            ProbeKind::Passive => ("passive", None),
            ProbeKind::PassiveWithActiveCheck(check) => (
                "active",
                (check.url != endpoint.url).then(|| check.url.clone()),
            ),
        };
        Self {
            name: endpoint.name.clone(),
            category: endpoint.category.clone(),
            method: endpoint.method,
            url: endpoint.url.clone(),
            probe: probe.to_string(),
            active_url,
        }
    }
}

fn colored_state(state: HealthState) -> String {
    match state {
        HealthState::Online => "Online".green().to_string(),
        HealthState::Degraded => "Degraded".yellow().to_string(),
        HealthState::Redirect => "Redirect".cyan().to_string(),
        HealthState::Offline => "Offline".red().to_string(),
    }
}

fn colored_activity(activity: Option<ActivityState>) -> String {
    match activity {
        None => "-".to_string(),
        Some(ActivityState::Idle) => "Idle".dimmed().to_string(),
        Some(ActivityState::Passing) => "Passing".green().to_string(),
        Some(ActivityState::Failing) => "Failing".red().to_string(),
    }
}

/// Format snapshots as a table
pub fn format_snapshots_table(snapshots: &[StatusSnapshot]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name", "Category", "Status", "Code", "Latency", "Avg", "Uptime", "Activity",
    ]);

    for s in snapshots {
        let code = if s.status_code == 0 {
            "-".to_string()
        } else {
            s.status_code.to_string()
        };

        table.add_row(vec![
            Cell::new(format!("{} {}", s.icon, s.name)),
            Cell::new(&s.category),
            Cell::new(colored_state(s.status)),
            Cell::new(code),
            Cell::new(format!("{}s", s.response_time)),
            Cell::new(format!("{}s", s.average)),
            Cell::new(format!("{}%", s.uptime)),
            Cell::new(colored_activity(s.activity)),
        ]);
    }

    table.to_string()
}

/// Format snapshots as JSON, the same shape `/api/status` returns
pub fn format_snapshots_json(snapshots: &[StatusSnapshot]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshots)
}

/// Format endpoints as a table
pub fn format_endpoints_table(endpoints: &[EndpointView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Category", "Method", "URL", "Probe"]);

    for e in endpoints {
        let probe = match &e.active_url {
            Some(url) => format!("{} ({})", e.probe, url),
            None => e.probe.clone(),
        };
        table.add_row(vec![
            Cell::new(&e.name),
            Cell::new(&e.category),
            Cell::new(e.method),
            Cell::new(&e.url),
            Cell::new(probe),
        ]);
    }

    table.to_string()
}

/// Format endpoints as JSON
pub fn format_endpoints_json(endpoints: &[EndpointView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "endpoints": endpoints
    }))
}
