//! Validation of gate configuration values.
//!
//! Everything here runs once at startup. A value that passes validation is
//! guaranteed to be usable on the hot path without further checks (header
//! names and values are pre-parsed into their `http` types).

use axum::http::{HeaderName, HeaderValue};

use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for a server version string.
pub const MAX_VERSION_LENGTH: usize = 64;

/// Maximum length for an allowlisted route path.
pub const MAX_PATH_LENGTH: usize = 2048;

/// Parse a configured header name.
///
/// `source` names the configuration entry for error messages
/// (e.g. `CUSTOM_RESPONSE_HEADERS`).
pub fn validate_header_name(name: &str, source: &str) -> AppResult<HeaderName> {
    if name.is_empty() {
        return Err(AppError::ConfigError(format!(
            "{source}: header name cannot be empty"
        )));
    }

    HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        AppError::ConfigError(format!("{source}: '{name}' is not a valid header name"))
    })
}

/// Parse a configured header value.
///
/// Rejects control characters (including CR/LF), which would otherwise allow
/// response splitting through configuration.
pub fn validate_header_value(name: &str, value: &str, source: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        AppError::ConfigError(format!(
            "{source}: value for header '{name}' contains invalid characters"
        ))
    })
}

/// Validate a path from the XSRF allowlist.
///
/// Rules:
/// - Must start with `/`
/// - Must not exceed 2048 characters
/// - Must not contain whitespace or control characters
pub fn validate_allowlist_path(path: &str) -> AppResult<()> {
    if !path.starts_with('/') {
        return Err(AppError::ConfigError(format!(
            "XSRF_ALLOWLIST: path '{path}' must start with '/'"
        )));
    }

    if path.len() > MAX_PATH_LENGTH {
        return Err(AppError::ConfigError(format!(
            "XSRF_ALLOWLIST: path cannot exceed {MAX_PATH_LENGTH} characters"
        )));
    }

    if let Some(pos) = path
        .chars()
        .position(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AppError::ConfigError(format!(
            "XSRF_ALLOWLIST: path '{}' contains whitespace or control character at position {pos}",
            path.escape_debug()
        )));
    }

    Ok(())
}

/// Validate the server version compared against `kbn-version`.
///
/// The version must be non-empty: an empty expected version would reject
/// every client that sends the header.
pub fn validate_server_version(version: &str) -> AppResult<()> {
    if version.is_empty() {
        return Err(AppError::ConfigError(
            "SERVER_VERSION cannot be empty".to_string(),
        ));
    }

    if version.len() > MAX_VERSION_LENGTH {
        return Err(AppError::ConfigError(format!(
            "SERVER_VERSION cannot exceed {MAX_VERSION_LENGTH} characters (got {})",
            version.len()
        )));
    }

    // Must be sendable back to clients as a header value
    validate_header_value("kbn-version", version, "SERVER_VERSION")?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_header_name_is_lowercased() {
        let name = validate_header_name("X-Custom-Header", "TEST").unwrap();
        assert_eq!(name.as_str(), "x-custom-header");
    }

    #[test]
    fn test_invalid_header_names() {
        assert!(validate_header_name("", "TEST").is_err());
        assert!(validate_header_name("bad header", "TEST").is_err());
        assert!(validate_header_name("bad:header", "TEST").is_err());
    }

    #[test]
    fn test_header_value_rejects_crlf() {
        let err = validate_header_value("x-foo", "a\r\nSet-Cookie: x", "TEST").unwrap_err();
        assert!(err.to_string().contains("x-foo"));
    }

    #[test]
    fn test_header_value_accepts_csp() {
        assert!(
            validate_header_value(
                "content-security-policy",
                "script-src 'self'; style-src 'self' 'unsafe-inline'",
                "CSP_HEADER"
            )
            .is_ok()
        );
    }

    #[test]
    fn test_allowlist_path_rules() {
        assert!(validate_allowlist_path("/api/echo").is_ok());
        assert!(validate_allowlist_path("/api/{id}").is_ok());
        assert!(validate_allowlist_path("api/echo").is_err());
        assert!(validate_allowlist_path("/api /echo").is_err());
        assert!(validate_allowlist_path("").is_err());
    }

    #[test]
    fn test_allowlist_path_too_long() {
        let path = format!("/{}", "a".repeat(MAX_PATH_LENGTH));
        assert!(validate_allowlist_path(&path).is_err());
    }

    #[test]
    fn test_server_version_rules() {
        assert!(validate_server_version("7.10.0").is_ok());
        assert!(validate_server_version("8.0.0-SNAPSHOT").is_ok());
        assert!(validate_server_version("").is_err());
        assert!(validate_server_version(&"9".repeat(MAX_VERSION_LENGTH + 1)).is_err());
        assert!(validate_server_version("1.0\n").is_err());
    }
}
