//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: DatabaseCheck,
}

#[derive(Serialize)]
pub struct DatabaseCheck {
    pub up: bool,
    pub read_replica: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness: the process is serving requests
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: estatehub_common::VERSION,
    })
}

/// Readiness: the store answers on every configured connection
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let read_replica = state.db.replica.is_some();

    let (status, database) = match state.repo.ping().await {
        Ok(()) => (
            StatusCode::OK,
            DatabaseCheck {
                up: true,
                read_replica,
                latency_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseCheck {
                    up: false,
                    read_replica,
                    latency_ms: None,
                    error: Some(e.to_string()),
                },
            )
        }
    };

    let label = if database.up { "ready" } else { "not_ready" };
    (status, Json(ReadyResponse { status: label, database }))
}
