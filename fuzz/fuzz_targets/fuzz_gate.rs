//! Fuzz testing for the admission gate and its configuration validators.
//!
//! Ensures that for arbitrary methods, paths and header values:
//!
//! - No pre-routing check panics
//! - The gate always produces either admitted headers or a rejection
//! - Config validators never panic on untrusted strings
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_gate -- -max_total_time=60
//! ```

#![no_main]

use admission_gate::GateConfig;
use admission_gate::gate::{AdmissionGate, GateRequest, RouteConfig};
use admission_gate::validation::{
    validate_allowlist_path, validate_header_name, validate_header_value, validate_server_version,
};
use arbitrary::Arbitrary;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    method: String,
    path: String,
    internal: bool,
    xsrf_required: bool,
    restrict_internal_apis: bool,
    headers: Vec<(String, Vec<u8>)>,
}

fuzz_target!(|input: Input| {
    // Validators must reject, never panic
    let _ = validate_header_name(&input.path, "FUZZ");
    let _ = validate_header_value("x-fuzz", &input.path, "FUZZ");
    let _ = validate_allowlist_path(&input.path);
    let _ = validate_server_version(&input.path);

    let Ok(method) = Method::from_bytes(input.method.as_bytes()) else {
        return;
    };

    let mut headers = HeaderMap::new();
    for (name, value) in &input.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value),
        ) {
            headers.append(name, value);
        }
    }

    let config = GateConfig {
        server_version: "7.10.0".to_string(),
        restrict_internal_apis: input.restrict_internal_apis,
        xsrf_allowlist: vec!["/api/allowed".to_string()],
        ..GateConfig::default()
    };
    let Ok(gate) = AdmissionGate::from_config(&config) else {
        return;
    };

    let mut route = RouteConfig::new(input.path.clone()).xsrf_required(input.xsrf_required);
    if input.internal {
        route = route.internal();
    }

    let request = GateRequest::new(&method, &input.path, &headers, &route);
    let _ = gate.run_pre_checks(&request);

    let mut response_headers = headers.clone();
    gate.apply_response_transforms(&mut response_headers);
});
