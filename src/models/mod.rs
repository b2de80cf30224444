mod api;

pub use api::{EchoResponse, ErrorBody, GateSummary, HealthResponse, StatusResponse};
