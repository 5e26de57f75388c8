//! Health check handler

use axum::{extract::State, response::Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::ServiceStatus;
use crate::web::{AppState, responses::ok};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
    #[serde(flatten)]
    pub service: ServiceStatus,
}

/// Liveness plus dataset and cache state; never loads the dataset
pub async fn health_check(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.start_time,
        uptime_seconds: (now - state.start_time).num_seconds(),
        service: state.service.status().await,
    })
}
