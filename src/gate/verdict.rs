//! Check outcomes and the rejection taxonomy.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::error_response;

/// Outcome of a single pre-routing check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Let the request proceed, optionally adding headers to the eventual response.
    Continue(Option<HeaderMap>),
    /// Stop processing and answer with the rejection.
    Reject(Rejection),
}

impl Verdict {
    /// Continue without header mutations.
    pub fn next() -> Self {
        Verdict::Continue(None)
    }

    /// Continue and merge `headers` into the routed response.
    pub fn next_with_headers(headers: HeaderMap) -> Self {
        Verdict::Continue(Some(headers))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Reject(rejection) => Some(rejection),
            Verdict::Continue(_) => None,
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        Verdict::Reject(rejection)
    }
}

/// Policy rejections produced by the pre-routing checks.
///
/// All of them are deterministic and local to a single request; they are
/// answered with `400 Bad Request` and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Request must contain a kbn-xsrf header.")]
    MissingXsrfHeader,

    #[error(
        "uri [{path}] with method [{method}] exists but is not available with the current configuration"
    )]
    InternalRouteForbidden { path: String, method: String },

    #[error(
        "Browser client is out of date, please refresh the page (\"kbn-version\" header was \"{got}\" but should be \"{expected}\")"
    )]
    VersionMismatch { expected: String, got: String },
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Stable identifier used in logs and metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingXsrfHeader => "missing_xsrf_header",
            Rejection::InternalRouteForbidden { .. } => "internal_route_forbidden",
            Rejection::VersionMismatch { .. } => "version_mismatch",
        }
    }

    /// Structured details for programmatic consumers.
    pub fn attributes(&self) -> Option<Value> {
        match self {
            Rejection::VersionMismatch { expected, got } => Some(json!({
                "expected": expected,
                "got": got,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string(), self.attributes())
    }
}
