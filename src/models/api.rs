use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// JSON error body shared by gate rejections and application errors.
///
/// ```json
/// {
///   "statusCode": 400,
///   "error": "Bad Request",
///   "message": "Request must contain a kbn-xsrf header."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Numeric HTTP status code
    pub status_code: u16,
    /// Canonical reason phrase for the status code
    pub error: String,
    /// Human-readable description of the failure
    pub message: String,
    /// Structured details for programmatic consumers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status ("healthy")
    pub status: String,
    /// Configured server name (also sent as `kbn-name`)
    pub name: String,
    /// Server version clients must match via `kbn-version`
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// Gate settings exposed by the status endpoint.
#[derive(Debug, Serialize)]
pub struct GateSummary {
    pub xsrf_protection: bool,
    pub xsrf_allowlist: Vec<String>,
    pub restrict_internal_apis: bool,
}

/// Service status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub version: String,
    pub gate: GateSummary,
}

/// Response for the echo endpoints.
#[derive(Debug, Serialize)]
pub struct EchoResponse {
    /// Request body as received
    pub received: Value,
    /// Route template that served the request
    pub route: String,
    /// When the request was handled
    pub received_at: DateTime<Utc>,
}
