//! Client version check.
//!
//! Only clients that send `kbn-version` are checked; API consumers that omit
//! the header are never blocked.

use tracing::debug;

use super::request::{GateRequest, VERSION_HEADER};
use super::verdict::{Rejection, Verdict};
use super::PreRoutingCheck;

#[derive(Debug, Clone)]
pub struct VersionCheck {
    server_version: String,
}

impl VersionCheck {
    pub fn new(server_version: impl Into<String>) -> Self {
        Self {
            server_version: server_version.into(),
        }
    }
}

impl PreRoutingCheck for VersionCheck {
    fn name(&self) -> &'static str {
        "version"
    }

    fn check(&self, request: &GateRequest<'_>) -> Verdict {
        match request.header_str(VERSION_HEADER) {
            // An empty header counts as absent
            Some(got) if !got.is_empty() && got != self.server_version.as_str() => {
                debug!(
                    expected = %self.server_version,
                    got = %got,
                    "Client version mismatch"
                );
                Rejection::VersionMismatch {
                    expected: self.server_version.clone(),
                    got: got.into_owned(),
                }
                .into()
            }
            _ => Verdict::next(),
        }
    }
}
