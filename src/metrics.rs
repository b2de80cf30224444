//! Prometheus metrics for the admission gate.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gate_requests_admitted_total` - Requests that passed every pre-routing check
//! - `gate_requests_rejected_total` - Rejected requests (label: reason)
//!
//! ## Histograms
//! - `gate_pre_checks_duration_seconds` - Time spent in the pre-routing checks
//! - `gate_request_duration_seconds` - Full request duration (labels: method, status)
//!
//! Recording functions are no-ops until [`init_metrics`] installs the exporter.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_ADMITTED_TOTAL: &str = "gate_requests_admitted_total";
    pub const REQUESTS_REJECTED_TOTAL: &str = "gate_requests_rejected_total";
    pub const PRE_CHECKS_DURATION_SECONDS: &str = "gate_pre_checks_duration_seconds";
    pub const REQUEST_DURATION_SECONDS: &str = "gate_request_duration_seconds";
}

/// Initialize the Prometheus metrics exporter.
///
/// # Arguments
///
/// * `metrics_addr` - Address for the Prometheus metrics endpoint
///
/// # Returns
///
/// `Ok(())` if initialization succeeds, `Err` with message otherwise.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::REQUESTS_ADMITTED_TOTAL,
        "Total number of requests admitted by the gate"
    );
    describe_counter!(
        names::REQUESTS_REJECTED_TOTAL,
        "Total number of requests rejected by the gate"
    );
    describe_histogram!(
        names::PRE_CHECKS_DURATION_SECONDS,
        "Time spent evaluating pre-routing checks in seconds"
    );
    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

pub fn record_request_admitted() {
    counter!(names::REQUESTS_ADMITTED_TOTAL).increment(1);
}

pub fn record_request_rejected(reason: &'static str) {
    counter!(names::REQUESTS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_pre_checks_duration(duration_secs: f64) {
    histogram!(names::PRE_CHECKS_DURATION_SECONDS).record(duration_secs);
}

pub fn record_request_duration(method: &str, status: &str, duration_secs: f64) {
    histogram!(names::REQUEST_DURATION_SECONDS, "method" => method.to_string(), "status" => status.to_string())
        .record(duration_secs);
}
