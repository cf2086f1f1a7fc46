//! Snapshot endpoints.

use crate::api::AppState;
use crate::scheduler::StatusSnapshot;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `GET /api/base-url`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseUrlResponse {
    pub base_url: String,
}

/// GET /api/status - Run one cycle and return every snapshot.
///
/// Snapshots are in completion order. Concurrent requests wait for the
/// running cycle before starting their own.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<Vec<StatusSnapshot>> {
    Json(state.scheduler.run_cycle().await)
}

/// GET /api/base-url - Default base URL from configuration.
pub async fn base_url(State(state): State<Arc<AppState>>) -> Json<BaseUrlResponse> {
    Json(BaseUrlResponse {
        base_url: state.scheduler.base_url().to_string(),
    })
}
