//! # HTTP Surface
//!
//! JSON endpoints consumed by the status dashboard.
//!
//! ## Endpoints
//!
//! - `GET /api/status` - Run one probe cycle and return every endpoint's snapshot
//! - `GET /api/base-url` - Default base URL endpoints are resolved against
//! - `GET /health` - Liveness summary of the monitor itself
//! - `GET /metrics` - Prometheus text exposition
//!
//! ## Example
//!
//! ```no_run
//! use vigil::api::{create_router, AppState};
//! use vigil::config::VigilConfig;
//! use vigil::scheduler::CycleScheduler;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(VigilConfig::default());
//! let scheduler = Arc::new(CycleScheduler::from_config(&config)?);
//!
//! let state = Arc::new(AppState::new(scheduler, config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod health;
mod status;

pub use health::{EndpointCounts, HealthResponse};
pub use status::BaseUrlResponse;

use crate::config::VigilConfig;
use crate::metrics::MetricsCollector;
use crate::scheduler::CycleScheduler;
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub scheduler: Arc<CycleScheduler>,
    pub config: Arc<VigilConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create new application state around a scheduler and its configuration.
    pub fn new(scheduler: Arc<CycleScheduler>, config: Arc<VigilConfig>) -> Self {
        let start_time = Instant::now();

        // Initialize metrics (safe to call multiple times - will reuse existing if already set)
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            // If metrics are already initialized (e.g., in tests), create a new handle
            // by building a recorder without installing it globally
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            crate::metrics::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(scheduler.store()),
            start_time,
            prometheus_handle,
        ));

        Self {
            scheduler,
            config,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/api/status", get(status::handle))
        .route("/api/base-url", get(status::base_url))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
