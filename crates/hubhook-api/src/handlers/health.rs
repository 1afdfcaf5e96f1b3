//! Health check handlers for service monitoring.
//!
//! The service holds no external dependencies at runtime, so both
//! probes are process-local: if the HTTP server answers, the service is
//! healthy.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use tracing::{debug, instrument};

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: HealthStatus,
    /// Service version information.
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational.
    Healthy,
}

/// Health check endpoint handler.
///
/// Designed to be called frequently by orchestration systems and load
/// balancers; performs no expensive work.
#[instrument(name = "health_check")]
pub async fn health_check() -> Response {
    debug!("Performing health check");

    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness check endpoint for orchestration probes.
///
/// Minimal check that the server process is responding; tests no
/// dependencies.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "service": "hubhook-api"
    });

    (StatusCode::OK, Json(response)).into_response()
}
