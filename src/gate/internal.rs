//! Internal-route restriction.
//!
//! Only the presence of the internal-origin header is checked, never its value.

use tracing::debug;

use super::request::{GateRequest, INTERNAL_ORIGIN_HEADER};
use super::verdict::{Rejection, Verdict};
use super::PreRoutingCheck;

#[derive(Debug, Clone, Copy, Default)]
pub struct InternalRouteCheck {
    restrict: bool,
}

impl InternalRouteCheck {
    pub fn new(restrict_internal_apis: bool) -> Self {
        Self {
            restrict: restrict_internal_apis,
        }
    }
}

impl PreRoutingCheck for InternalRouteCheck {
    fn name(&self) -> &'static str {
        "internal_route"
    }

    fn check(&self, request: &GateRequest<'_>) -> Verdict {
        if !self.restrict
            || !request.route().is_internal()
            || request.has_header(INTERNAL_ORIGIN_HEADER)
        {
            return Verdict::next();
        }

        debug!(
            path = request.path(),
            route = %request.route().path,
            "Internal route called without internal-origin header"
        );

        Rejection::InternalRouteForbidden {
            path: request.path().to_string(),
            method: request.method().as_str().to_string(),
        }
        .into()
    }
}
