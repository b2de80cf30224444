//! Cross-site request forgery check.
//!
//! Browsers cannot attach custom headers to cross-origin form submissions, so
//! the mere presence of `kbn-xsrf` (or `kbn-version`, which only programmatic
//! clients send) marks a state-changing request as same-origin.

use std::collections::HashSet;

use tracing::trace;

use super::request::{GateRequest, VERSION_HEADER, XSRF_HEADER};
use super::verdict::{Rejection, Verdict};
use super::PreRoutingCheck;
use crate::config::GateConfig;

#[derive(Debug, Clone, Default)]
pub struct XsrfCheck {
    allowlist: HashSet<String>,
    disabled: bool,
}

impl XsrfCheck {
    pub fn new(allowlist: impl IntoIterator<Item = String>, disabled: bool) -> Self {
        Self {
            allowlist: allowlist.into_iter().collect(),
            disabled,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.xsrf_allowlist.iter().cloned(), config.xsrf_disabled)
    }
}

impl PreRoutingCheck for XsrfCheck {
    fn name(&self) -> &'static str {
        "xsrf"
    }

    fn check(&self, request: &GateRequest<'_>) -> Verdict {
        let route = request.route();

        if self.disabled || self.allowlist.contains(&route.path) || !route.xsrf_required {
            trace!(route = %route.path, "XSRF check not applicable");
            return Verdict::next();
        }

        if request.is_safe_method()
            || request.has_header(VERSION_HEADER)
            || request.has_header(XSRF_HEADER)
        {
            return Verdict::next();
        }

        Rejection::MissingXsrfHeader.into()
    }
}
