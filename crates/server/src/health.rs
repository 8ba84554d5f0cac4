use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use crate::elastic::SearchEngine;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the application start time. Call once during startup.
pub fn record_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Health check response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `connected` or `unreachable`, from the engine liveness probe.
    pub engine: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Health check handler. Always 200; engine trouble shows in `engine`.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(engine): State<Arc<dyn SearchEngine>>) -> Json<HealthResponse> {
    let engine_status = if engine.ping().await {
        "connected"
    } else {
        "unreachable"
    };

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    Json(HealthResponse {
        status: "ok".to_string(),
        engine: engine_status.to_string(),
        uptime_seconds: uptime,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
