//! Request admission gate.
//!
//! A fixed pipeline of pre-routing checks applied to every routed request,
//! plus response transforms applied to every response leaving the service.
//!
//! # Lifecycle
//!
//! ```text
//! Pending ──► PreChecksRunning ──(any Reject)──► Rejected ─────┐
//!                    │                                         │
//!                    └──(all Continue)──► Routed ──► handler   │
//!                                            │                 │
//!                                            ▼                 ▼
//!                                 response transforms ◄────────┘
//!                                            │
//!                                            ▼
//!                                      ResponseReady
//! ```
//!
//! Checks run in registration order and stop at the first rejection.
//! Response transforms run on every response, rejections included.
//!
//! # Example
//!
//! ```rust
//! use admission_gate::gate::{
//!     AdmissionGate, GateRequest, InternalRouteCheck, RouteConfig, VersionCheck, XsrfCheck,
//! };
//! use axum::http::{HeaderMap, Method};
//!
//! let gate = AdmissionGate::builder()
//!     .pre_check(XsrfCheck::default())
//!     .pre_check(VersionCheck::new("7.10.0"))
//!     .pre_check(InternalRouteCheck::new(true))
//!     .build();
//!
//! let route = RouteConfig::new("/api/echo").method(Method::POST);
//! let headers = HeaderMap::new();
//! let request = GateRequest::new(&Method::POST, "/api/echo", &headers, &route);
//!
//! assert!(gate.run_pre_checks(&request).is_err());
//! ```

mod headers;
mod internal;
mod request;
mod route_table;
mod verdict;
mod version;
mod xsrf;

use std::fmt;

use axum::http::HeaderMap;
use tracing::{debug, info};

use crate::config::GateConfig;
use crate::error::AppResult;

pub use headers::CustomHeaders;
pub use internal::InternalRouteCheck;
pub use request::{
    GateRequest, INTERNAL_ORIGIN_HEADER, NAME_HEADER, RouteAccess, RouteConfig, VERSION_HEADER,
    XSRF_HEADER, is_safe_method,
};
pub use route_table::RouteTable;
pub use verdict::{Rejection, Verdict};
pub use version::VersionCheck;
pub use xsrf::XsrfCheck;

/// A check evaluated before the request reaches its handler.
///
/// Implementations must be pure: no I/O, no shared mutable state.
pub trait PreRoutingCheck: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn check(&self, request: &GateRequest<'_>) -> Verdict;
}

/// A transform applied to the headers of every outgoing response.
///
/// Transforms never reject and must not depend on the response body.
pub trait ResponseTransform: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn transform(&self, headers: &mut HeaderMap);
}

/// Immutable, ordered set of pre-routing checks and response transforms.
///
/// Built once at startup and shared behind an `Arc`.
pub struct AdmissionGate {
    pre_checks: Box<[Box<dyn PreRoutingCheck>]>,
    transforms: Box<[Box<dyn ResponseTransform>]>,
}

impl AdmissionGate {
    pub fn builder() -> AdmissionGateBuilder {
        AdmissionGateBuilder::default()
    }

    /// Gate with the core handlers registered in their fixed order:
    /// XSRF, version, internal-route restriction; then header injection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if a configured response header is invalid.
    pub fn from_config(config: &GateConfig) -> AppResult<Self> {
        let gate = Self::builder()
            .pre_check(XsrfCheck::from_config(config))
            .pre_check(VersionCheck::new(config.server_version.clone()))
            .pre_check(InternalRouteCheck::new(config.restrict_internal_apis))
            .response_transform(CustomHeaders::from_config(config)?)
            .build();

        info!(
            pre_checks = ?gate.pre_check_names(),
            transforms = ?gate.transform_names(),
            xsrf_disabled = config.xsrf_disabled,
            xsrf_allowlist = config.xsrf_allowlist.len(),
            restrict_internal_apis = config.restrict_internal_apis,
            server_version = %config.server_version,
            "Admission gate configured"
        );

        Ok(gate)
    }

    /// Run the pre-routing checks in order.
    ///
    /// Returns the header mutations accumulated from `Continue` verdicts, or
    /// the first rejection. Checks after a rejection are not evaluated.
    pub fn run_pre_checks(&self, request: &GateRequest<'_>) -> Result<HeaderMap, Rejection> {
        let mut extra_headers = HeaderMap::new();

        for check in self.pre_checks.iter() {
            match check.check(request) {
                Verdict::Continue(Some(headers)) => {
                    for (name, value) in headers.iter() {
                        extra_headers.insert(name.clone(), value.clone());
                    }
                }
                Verdict::Continue(None) => {}
                Verdict::Reject(rejection) => {
                    debug!(
                        check = check.name(),
                        reason = rejection.reason(),
                        "Pre-routing check rejected request"
                    );
                    return Err(rejection);
                }
            }
        }

        Ok(extra_headers)
    }

    /// Apply every response transform in order.
    pub fn apply_response_transforms(&self, headers: &mut HeaderMap) {
        for transform in self.transforms.iter() {
            transform.transform(headers);
        }
    }

    pub fn pre_check_names(&self) -> Vec<&'static str> {
        self.pre_checks.iter().map(|check| check.name()).collect()
    }

    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("pre_checks", &self.pre_check_names())
            .field("transforms", &self.transform_names())
            .finish()
    }
}

/// Collects checks and transforms in registration order.
#[derive(Default)]
pub struct AdmissionGateBuilder {
    pre_checks: Vec<Box<dyn PreRoutingCheck>>,
    transforms: Vec<Box<dyn ResponseTransform>>,
}

impl AdmissionGateBuilder {
    pub fn pre_check(mut self, check: impl PreRoutingCheck + 'static) -> Self {
        self.pre_checks.push(Box::new(check));
        self
    }

    pub fn response_transform(mut self, transform: impl ResponseTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn build(self) -> AdmissionGate {
        AdmissionGate {
            pre_checks: self.pre_checks.into_boxed_slice(),
            transforms: self.transforms.into_boxed_slice(),
        }
    }
}
