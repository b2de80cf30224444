//! Echo endpoints used to exercise the gate end-to-end.
//!
//! `POST /api/echo` is public; `POST /internal/echo` is internal and subject
//! to the internal-route restriction.

use axum::Json;
use axum::extract::MatchedPath;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::models::EchoResponse;

/// Echo the JSON request body back to the caller.
#[instrument(skip(body))]
pub async fn echo(
    path: MatchedPath,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<EchoResponse>> {
    let Json(received) = body?;
    debug!(route = path.as_str(), "Echoing request body");

    Ok(Json(EchoResponse {
        received,
        route: path.as_str().to_string(),
        received_at: Utc::now(),
    }))
}
