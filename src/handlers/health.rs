//! Health, status, and fallback endpoints.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness check (XSRF not required)
//! - `GET /api/status` - Server name, version, and gate settings
//! - any unmatched path - 404 JSON error

use axum::Json;
use axum::extract::State;
use axum::http::Uri;
use chrono::Utc;
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::models::{GateSummary, HealthResponse, StatusResponse};
use crate::state::AppState;

/// Health check endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "name": "gate-1",
///   "version": "0.1.0",
///   "uptime_seconds": 42,
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let gate = &state.config.gate;

    Json(HealthResponse {
        status: "healthy".to_string(),
        name: gate.server_name.clone(),
        version: gate.server_version.clone(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
    })
}

/// Server status endpoint.
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let gate = &state.config.gate;

    Json(StatusResponse {
        name: gate.server_name.clone(),
        version: gate.server_version.clone(),
        gate: GateSummary {
            xsrf_protection: !gate.xsrf_disabled,
            xsrf_allowlist: gate.xsrf_allowlist.clone(),
            restrict_internal_apis: gate.restrict_internal_apis,
        },
    })
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> AppResult<()> {
    Err(AppError::NotFound(format!(
        "No route matches [{}]",
        uri.path()
    )))
}
