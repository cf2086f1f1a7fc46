//! # Metrics HTTP Handlers
//!
//! Axum handlers for metrics endpoints.

use crate::api::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Handler for GET /metrics endpoint (Prometheus text format).
///
/// Returns metrics in Prometheus exposition format for scraping.
/// Always returns 200 with the correct Content-Type for Prometheus scrapers,
/// even if no metrics have been recorded yet (returns empty text).
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Refresh rolling gauges before rendering
    state.metrics_collector.update_store_gauges();

    let metrics = state.metrics_collector.render_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VigilConfig;
    use crate::scheduler::CycleScheduler;

    #[tokio::test]
    async fn test_metrics_handler_returns_text() {
        let config = Arc::new(VigilConfig::default());
        let scheduler = Arc::new(CycleScheduler::from_config(&config).unwrap());
        let state = Arc::new(AppState::new(scheduler, config));

        let response = metrics_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; version=0.0.4; charset=utf-8"
        );
    }
}
