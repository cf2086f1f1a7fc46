//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub endpoints: EndpointCounts,
}

/// Endpoint counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointCounts {
    /// Configured endpoints
    pub total: usize,
    /// Endpoints with rolling history
    pub tracked: usize,
    /// Tracked endpoints whose latest probe succeeded
    pub online: usize,
}

/// GET /health - Return monitor health status.
///
/// Reads the rolling store only; it never triggers a probe cycle.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.scheduler.store();
    let total = state.scheduler.endpoints().len();
    let tracked = store.len();
    let online = state
        .scheduler
        .endpoints()
        .iter()
        .filter(|e| store.last_success(&e.name) == Some(true))
        .count();

    let status = match (online, tracked) {
        (_, 0) => "idle",
        (o, t) if o == t => "healthy",
        (o, _) if o > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        endpoints: EndpointCounts {
            total,
            tracked,
            online,
        },
    })
}
