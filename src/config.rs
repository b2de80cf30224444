//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! # Gate Configuration
//!
//! - `XSRF_ALLOWLIST`: Comma-separated route paths exempt from the XSRF check
//! - `XSRF_DISABLE_PROTECTION`: Disable the XSRF check entirely (default: false)
//! - `RESTRICT_INTERNAL_APIS`: Reject internal routes without the internal-origin header
//! - `SERVER_VERSION`: Version clients must send in `kbn-version` (default: crate version)
//! - `SERVER_NAME`: Value of the `kbn-name` response header
//!
//! # Response Headers
//!
//! - `CSP_HEADER`: `Content-Security-Policy` value
//! - `CUSTOM_RESPONSE_HEADERS`: JSON object, e.g. `{"X-Team":"platform"}`
//! - `SECURITY_STRICT_TRANSPORT_SECURITY`, `SECURITY_X_CONTENT_TYPE_OPTIONS`,
//!   `SECURITY_REFERRER_POLICY`, `SECURITY_PERMISSIONS_POLICY`,
//!   `SECURITY_CROSS_ORIGIN_OPENER_POLICY`: set to an empty string to omit
//! - `SECURITY_DISABLE_EMBEDDING`: Send `X-Frame-Options: SAMEORIGIN` and
//!   restrict `frame-ancestors` in the CSP

use std::collections::BTreeMap;
use std::env;

use crate::error::{AppError, AppResult};
use crate::validation::{
    validate_allowlist_path, validate_header_name, validate_header_value, validate_server_version,
};

/// Default `Content-Security-Policy` header value.
pub const DEFAULT_CSP_HEADER: &str = "script-src 'report-sample' 'self'; \
     worker-src 'report-sample' 'self' blob:; \
     style-src 'report-sample' 'self' 'unsafe-inline'";

/// Fallback server name when neither `SERVER_NAME` nor `HOSTNAME` is set.
pub const DEFAULT_SERVER_NAME: &str = "admission-gate";

/// Process-wide settings consumed by the admission gate.
///
/// Loaded once at startup and shared read-only by all requests.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Route paths exempt from the XSRF check
    pub xsrf_allowlist: Vec<String>,
    /// Disable the XSRF check for every route
    pub xsrf_disabled: bool,
    /// Reject `internal` routes that lack the internal-origin header
    pub restrict_internal_apis: bool,
    /// Version clients must send in `kbn-version`
    pub server_version: String,
    /// Security response headers (applied first)
    pub security_headers: BTreeMap<String, String>,
    /// Operator-defined response headers (override security headers)
    pub custom_headers: BTreeMap<String, String>,
    /// `Content-Security-Policy` value
    pub csp_header: String,
    /// `kbn-name` value
    pub server_name: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        let security = SecurityHeaderSettings::default();
        Self {
            xsrf_allowlist: vec![],
            xsrf_disabled: false,
            restrict_internal_apis: false,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            csp_header: security.apply_embedding_policy(DEFAULT_CSP_HEADER),
            security_headers: security.headers(),
            custom_headers: BTreeMap::new(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

/// Structured security header options.
///
/// `None` omits the corresponding header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaderSettings {
    pub strict_transport_security: Option<String>,
    pub x_content_type_options: Option<String>,
    pub referrer_policy: Option<String>,
    pub permissions_policy: Option<String>,
    pub cross_origin_opener_policy: Option<String>,
    pub disable_embedding: bool,
}

impl Default for SecurityHeaderSettings {
    fn default() -> Self {
        Self {
            strict_transport_security: None,
            x_content_type_options: Some("nosniff".to_string()),
            referrer_policy: Some("strict-origin-when-cross-origin".to_string()),
            permissions_policy: None,
            cross_origin_opener_policy: Some("same-origin".to_string()),
            disable_embedding: false,
        }
    }
}

impl SecurityHeaderSettings {
    /// Header map produced by these settings.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let entries = [
            (
                "Strict-Transport-Security",
                self.strict_transport_security.as_ref(),
            ),
            (
                "X-Content-Type-Options",
                self.x_content_type_options.as_ref(),
            ),
            ("Referrer-Policy", self.referrer_policy.as_ref()),
            ("Permissions-Policy", self.permissions_policy.as_ref()),
            (
                "Cross-Origin-Opener-Policy",
                self.cross_origin_opener_policy.as_ref(),
            ),
        ];

        let mut headers: BTreeMap<String, String> = entries
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.clone())))
            .collect();

        if self.disable_embedding {
            headers.insert("X-Frame-Options".to_string(), "SAMEORIGIN".to_string());
        }

        headers
    }

    /// Restrict framing in the CSP when embedding is disabled.
    ///
    /// A policy that already declares `frame-ancestors` is left untouched.
    pub fn apply_embedding_policy(&self, csp: &str) -> String {
        if !self.disable_embedding || csp.contains("frame-ancestors") {
            return csp.to_string();
        }

        let trimmed = csp.trim_end().trim_end_matches(';');
        if trimmed.is_empty() {
            "frame-ancestors 'self'".to_string()
        } else {
            format!("{trimmed}; frame-ancestors 'self'")
        }
    }

    fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            strict_transport_security: Config::parse_optional_header(
                "SECURITY_STRICT_TRANSPORT_SECURITY",
                defaults.strict_transport_security,
            ),
            x_content_type_options: Config::parse_optional_header(
                "SECURITY_X_CONTENT_TYPE_OPTIONS",
                defaults.x_content_type_options,
            ),
            referrer_policy: Config::parse_optional_header(
                "SECURITY_REFERRER_POLICY",
                defaults.referrer_policy,
            ),
            permissions_policy: Config::parse_optional_header(
                "SECURITY_PERMISSIONS_POLICY",
                defaults.permissions_policy,
            ),
            cross_origin_opener_policy: Config::parse_optional_header(
                "SECURITY_CROSS_ORIGIN_OPENER_POLICY",
                defaults.cross_origin_opener_policy,
            ),
            disable_embedding: Config::parse_env("SECURITY_DISABLE_EMBEDDING", false)?,
        })
    }
}

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_request_body_size: usize,

    // =========================================================================
    // Admission Gate Configuration
    // =========================================================================
    pub gate: GateConfig,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any configuration value is invalid
    /// (e.g., non-numeric PORT value, malformed header JSON).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let security = SecurityHeaderSettings::from_env()?;
        let csp_header = env::var("CSP_HEADER").unwrap_or_else(|_| DEFAULT_CSP_HEADER.to_string());

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 1024 * 1024)?, // 1MB

            // Gate
            gate: GateConfig {
                xsrf_allowlist: Self::parse_list("XSRF_ALLOWLIST"),
                xsrf_disabled: Self::parse_env("XSRF_DISABLE_PROTECTION", false)?,
                restrict_internal_apis: Self::parse_env("RESTRICT_INTERNAL_APIS", false)?,
                server_version: env::var("SERVER_VERSION")
                    .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
                security_headers: security.headers(),
                custom_headers: Self::parse_header_map("CUSTOM_RESPONSE_HEADERS")?,
                csp_header: security.apply_embedding_policy(&csp_header),
                server_name: Self::parse_server_name(),
            },

            // Observability
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        let gate = &self.gate;

        validate_server_version(&gate.server_version)?;

        for path in &gate.xsrf_allowlist {
            validate_allowlist_path(path)?;
        }

        for (name, value) in &gate.security_headers {
            validate_header_name(name, "SECURITY_*")?;
            validate_header_value(name, value, "SECURITY_*")?;
        }

        for (name, value) in &gate.custom_headers {
            validate_header_name(name, "CUSTOM_RESPONSE_HEADERS")?;
            validate_header_value(name, value, "CUSTOM_RESPONSE_HEADERS")?;
        }

        validate_header_value("content-security-policy", &gate.csp_header, "CSP_HEADER")?;

        if gate.server_name.is_empty() {
            return Err(AppError::ConfigError(
                "SERVER_NAME cannot be empty".to_string(),
            ));
        }
        validate_header_value("kbn-name", &gate.server_name, "SERVER_NAME")?;

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse a comma-separated list, dropping empty entries.
    fn parse_list(name: &str) -> Vec<String> {
        env::var(name)
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse a JSON object of header name to header value.
    fn parse_header_map(name: &str) -> AppResult<BTreeMap<String, String>> {
        match env::var(name) {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|e| {
                AppError::ConfigError(format!(
                    "Invalid {name}: expected a JSON object of string values ({e})"
                ))
            }),
            _ => Ok(BTreeMap::new()),
        }
    }

    /// Optional header setting: unset keeps the default, empty disables it.
    fn parse_optional_header(name: &str, default: Option<String>) -> Option<String> {
        match env::var(name) {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value.trim().to_string()),
            Err(_) => default,
        }
    }

    fn parse_server_name() -> String {
        env::var("SERVER_NAME")
            .or_else(|_| env::var("HOSTNAME"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string())
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_request_body_size: 1024 * 1024, // 1MB
            // Gate
            gate: GateConfig::default(),
            // Observability
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(!config.gate.xsrf_disabled);
        assert!(!config.gate.restrict_internal_apis);
        assert!(config.gate.xsrf_allowlist.is_empty());
        assert_eq!(config.gate.server_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.gate.csp_header, DEFAULT_CSP_HEADER);
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "localhost".to_string(),
            port: 3000,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "localhost:3000");
    }

    #[test]
    fn test_metrics_addr() {
        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };
        assert!(!config.metrics_enabled());
        assert!(config.metrics_addr().is_none());

        let config = Config::default();
        assert_eq!(config.metrics_addr().unwrap().port(), 9090);
    }

    #[test]
    fn test_default_security_headers() {
        let headers = SecurityHeaderSettings::default().headers();

        assert_eq!(
            headers.get("X-Content-Type-Options").map(String::as_str),
            Some("nosniff")
        );
        assert_eq!(
            headers.get("Referrer-Policy").map(String::as_str),
            Some("strict-origin-when-cross-origin")
        );
        assert_eq!(
            headers.get("Cross-Origin-Opener-Policy").map(String::as_str),
            Some("same-origin")
        );
        assert!(!headers.contains_key("Strict-Transport-Security"));
        assert!(!headers.contains_key("X-Frame-Options"));
    }

    #[test]
    fn test_disable_embedding_adds_frame_options() {
        let settings = SecurityHeaderSettings {
            disable_embedding: true,
            ..SecurityHeaderSettings::default()
        };

        assert_eq!(
            settings.headers().get("X-Frame-Options").map(String::as_str),
            Some("SAMEORIGIN")
        );
        assert_eq!(
            settings.apply_embedding_policy("script-src 'self';"),
            "script-src 'self'; frame-ancestors 'self'"
        );
        assert_eq!(settings.apply_embedding_policy(""), "frame-ancestors 'self'");
    }

    #[test]
    fn test_embedding_policy_keeps_existing_frame_ancestors() {
        let settings = SecurityHeaderSettings {
            disable_embedding: true,
            ..SecurityHeaderSettings::default()
        };
        let csp = "frame-ancestors 'none'";

        assert_eq!(settings.apply_embedding_policy(csp), csp);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_body_size_zero() {
        let config = Config {
            max_request_body_size: 0,
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("MAX_REQUEST_BODY_SIZE"));
    }

    #[test]
    fn test_validate_rejects_bad_custom_header() {
        let mut config = Config::default();
        config
            .gate
            .custom_headers
            .insert("bad header".to_string(), "x".to_string());

        let result = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("CUSTOM_RESPONSE_HEADERS")
        );
    }

    #[test]
    fn test_validate_rejects_relative_allowlist_path() {
        let mut config = Config::default();
        config.gate.xsrf_allowlist = vec!["api/echo".to_string()];

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_server_version() {
        let mut config = Config::default();
        config.gate.server_version = String::new();

        assert!(config.validate().unwrap_err().to_string().contains("SERVER_VERSION"));
    }

    #[test]
    fn test_validate_rejects_multiline_csp() {
        let mut config = Config::default();
        config.gate.csp_header = "script-src 'self'\nX-Injected: yes".to_string();

        assert!(config.validate().unwrap_err().to_string().contains("CSP_HEADER"));
    }
}
