//! Shared test utilities for Vigil integration tests.
//!
//! Provides builders for configs, schedulers and routers pointed at
//! `wiremock` servers.

#![allow(dead_code)]

use axum::body::Body;
use std::collections::HashMap;
use std::sync::Arc;
use vigil::api::{create_router, AppState};
use vigil::config::{ActiveCheckConfig, BodyEncoding, EndpointConfig, HttpMethod, VigilConfig};
use vigil::health::{MonitorConfig, ProbeExecutor};
use vigil::history::RollingStore;
use vigil::scheduler::CycleScheduler;

/// Loopback address that refuses connections.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1";

// =============================================================================
// Config Builders
// =============================================================================

/// Monitor settings suited to fast tests.
pub fn test_monitor_config(base_url: &str) -> MonitorConfig {
    MonitorConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 2,
        latency_threshold_seconds: 1.0,
        worker_cap: 4,
        ..Default::default()
    }
}

/// Full config with one passive GET endpoint per `(name, path)`.
pub fn config_with_endpoints(base_url: &str, endpoints: &[(&str, &str)]) -> VigilConfig {
    VigilConfig {
        monitor: test_monitor_config(base_url),
        endpoints: endpoints
            .iter()
            .map(|(name, path)| EndpointConfig::new(*name, *path))
            .collect(),
        ..Default::default()
    }
}

/// Active check with the given expected codes and body field -> env var map.
pub fn active_check(expected: &[u16], fields: &[(&str, &str)]) -> ActiveCheckConfig {
    ActiveCheckConfig {
        expected_status: expected.iter().copied().collect(),
        encoding: BodyEncoding::Form,
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        method: Some(HttpMethod::Post),
        path: None,
    }
}

/// In-memory credential source.
pub fn credentials(pairs: &[(&str, &str)]) -> Arc<HashMap<String, String>> {
    Arc::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

// =============================================================================
// Scheduler / Router Builders
// =============================================================================

/// Scheduler over `config` using a plain client and the given credentials.
pub fn make_scheduler(
    config: &VigilConfig,
    creds: Arc<HashMap<String, String>>,
) -> CycleScheduler {
    let endpoints = config.resolve_endpoints().unwrap();
    let executor = ProbeExecutor::new(&config.monitor)
        .unwrap()
        .with_credentials(creds);
    let store = Arc::new(RollingStore::new(config.history.clone()));
    CycleScheduler::new(config.monitor.clone(), executor, store, endpoints)
}

/// Router backed by a scheduler built from `config`.
pub fn make_app(config: VigilConfig) -> axum::Router {
    let scheduler = Arc::new(make_scheduler(&config, credentials(&[])));
    let state = Arc::new(AppState::new(scheduler, Arc::new(config)));
    create_router(state)
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Collect a response body as a UTF-8 string.
pub async fn get_body_string(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
