//! Response header injection.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use super::ResponseTransform;
use super::request::NAME_HEADER;
use crate::config::GateConfig;
use crate::error::AppResult;
use crate::validation::{validate_header_name, validate_header_value};

/// Injects configured headers into every outgoing response.
///
/// Headers are applied in a fixed order, each one overwriting any earlier
/// value for the same (case-insensitive) name:
///
/// 1. security headers
/// 2. custom headers
/// 3. `Content-Security-Policy`
/// 4. `kbn-name`
#[derive(Debug, Clone, Default)]
pub struct CustomHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl CustomHeaders {
    /// Pre-parse the configured headers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any name or value is not a legal
    /// HTTP header.
    pub fn from_config(config: &GateConfig) -> AppResult<Self> {
        let mut headers = Vec::with_capacity(
            config.security_headers.len() + config.custom_headers.len() + 2,
        );

        for (name, value) in &config.security_headers {
            headers.push(parse_header(name, value, "SECURITY_*")?);
        }

        for (name, value) in &config.custom_headers {
            headers.push(parse_header(name, value, "CUSTOM_RESPONSE_HEADERS")?);
        }

        headers.push((
            header::CONTENT_SECURITY_POLICY,
            validate_header_value("content-security-policy", &config.csp_header, "CSP_HEADER")?,
        ));
        headers.push((
            HeaderName::from_static(NAME_HEADER),
            validate_header_value(NAME_HEADER, &config.server_name, "SERVER_NAME")?,
        ));

        Ok(Self { headers })
    }

    /// Headers in application order.
    pub fn entries(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }
}

fn parse_header(name: &str, value: &str, source: &str) -> AppResult<(HeaderName, HeaderValue)> {
    Ok((
        validate_header_name(name, source)?,
        validate_header_value(name, value, source)?,
    ))
}

impl ResponseTransform for CustomHeaders {
    fn name(&self) -> &'static str {
        "custom_headers"
    }

    fn transform(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}
