//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │   Set Request ID     │ ← Generates X-Request-Id if missing
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │  Response Headers    │ ← security/custom/CSP/kbn-name on every response
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Propagate Request ID │ ← Copies X-Request-Id to the response
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │       Tracing        │ ← HTTP request/response logging
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │    Body Limit        │
//! └──────────┬───────────┘
//!            ▼
//!         Router ──(no match)──► 404 fallback
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ Pre-routing checks   │ ← 400 on XSRF / version / internal-route rejection
//! └──────────┬───────────┘
//!            ▼
//!         Handler
//! ```

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppResult;
use crate::gate::{AdmissionGate, RouteConfig, RouteTable};
use crate::handlers;
use crate::middleware::{PreRoutingLayer, ResponseHeadersLayer};
use crate::state::AppState;

pub const HEALTH_PATH: &str = "/health";
pub const STATUS_PATH: &str = "/api/status";
pub const ECHO_PATH: &str = "/api/echo";
pub const INTERNAL_ECHO_PATH: &str = "/internal/echo";

/// Gate metadata for every application route.
pub fn application_routes() -> RouteTable {
    RouteTable::new([
        RouteConfig::new(HEALTH_PATH)
            .method(Method::GET)
            .xsrf_required(false),
        RouteConfig::new(STATUS_PATH).method(Method::GET),
        RouteConfig::new(ECHO_PATH).method(Method::POST),
        RouteConfig::new(INTERNAL_ECHO_PATH)
            .method(Method::POST)
            .internal(),
    ])
}

/// Build the application router with the admission gate installed.
///
/// # Errors
///
/// Returns `AppError::ConfigError` if the configured response headers are invalid.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    let gate = Arc::new(AdmissionGate::from_config(&config.gate)?);
    let routes = Arc::new(application_routes());
    info!(
        routes = routes.len(),
        internal = ?routes.internal_paths(),
        "Route gate metadata registered"
    );

    let router = Router::new()
        .route(HEALTH_PATH, get(handlers::health_check))
        .route(STATUS_PATH, get(handlers::status))
        .route(ECHO_PATH, post(handlers::echo))
        .route(INTERNAL_ECHO_PATH, post(handlers::echo))
        // Runs after route matching, only for matched routes
        .route_layer(PreRoutingLayer::new(gate.clone(), routes))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.max_request_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(ResponseHeadersLayer::new(gate))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    Ok(router.with_state(state))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::config::{Config, GateConfig};
    use crate::gate::{INTERNAL_ORIGIN_HEADER, VERSION_HEADER, XSRF_HEADER};

    fn router(gate: GateConfig) -> Router {
        build_router(AppState::new(Config {
            gate,
            ..Config::default()
        }))
        .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> Response {
        router.oneshot(request).await.unwrap()
    }

    fn post_json(uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_application_routes_metadata() {
        let routes = application_routes();

        assert!(!routes.get(HEALTH_PATH, &Method::GET).unwrap().xsrf_required);
        assert!(
            routes
                .get(INTERNAL_ECHO_PATH, &Method::POST)
                .unwrap()
                .is_internal()
        );
        assert!(!routes.get(ECHO_PATH, &Method::POST).unwrap().is_internal());
    }

    #[tokio::test]
    async fn test_health_is_admitted_and_decorated() {
        let response = send(
            router(GateConfig::default()),
            Request::builder().uri(HEALTH_PATH).body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("kbn-name"));
        assert!(response.headers().contains_key("content-security-policy"));
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_echo_requires_xsrf_header() {
        let response = send(
            router(GateConfig::default()),
            post_json(ECHO_PATH).body(Body::from(r#"{"a":1}"#)).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // Rejections are decorated too
        assert!(response.headers().contains_key("kbn-name"));
        let json = json_body(response).await;
        assert_eq!(json["message"], "Request must contain a kbn-xsrf header.");
    }

    #[tokio::test]
    async fn test_echo_with_xsrf_header() {
        let response = send(
            router(GateConfig::default()),
            post_json(ECHO_PATH)
                .header(XSRF_HEADER, "true")
                .body(Body::from(r#"{"a":1}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["received"]["a"], 1);
        assert_eq!(json["route"], ECHO_PATH);
    }

    #[tokio::test]
    async fn test_xsrf_allowlist_uses_route_path() {
        let gate = GateConfig {
            xsrf_allowlist: vec![ECHO_PATH.to_string()],
            ..GateConfig::default()
        };
        let response = send(
            router(gate),
            post_json(ECHO_PATH).body(Body::from("{}")).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let gate = GateConfig {
            server_version: "7.10.0".to_string(),
            ..GateConfig::default()
        };
        let response = send(
            router(gate),
            Request::builder()
                .uri(STATUS_PATH)
                .header(VERSION_HEADER, "7.9.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["attributes"]["expected"], "7.10.0");
        assert_eq!(json["attributes"]["got"], "7.9.0");
    }

    #[tokio::test]
    async fn test_internal_route_restriction() {
        let gate = GateConfig {
            restrict_internal_apis: true,
            ..GateConfig::default()
        };

        let rejected = send(
            router(gate.clone()),
            post_json(INTERNAL_ECHO_PATH)
                .header(XSRF_HEADER, "true")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        let json = json_body(rejected).await;
        assert_eq!(
            json["message"],
            "uri [/internal/echo] with method [POST] exists but is not available with the current configuration"
        );

        let admitted = send(
            router(gate),
            post_json(INTERNAL_ECHO_PATH)
                .header(XSRF_HEADER, "true")
                .header(INTERNAL_ORIGIN_HEADER, "Kibana")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
        assert_eq!(admitted.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_on_public_get_route_is_admitted() {
        let gate = GateConfig {
            restrict_internal_apis: true,
            ..GateConfig::default()
        };

        // HEAD is served from the GET handler and inherits its declaration
        let response = send(
            router(gate),
            Request::builder()
                .method(Method::HEAD)
                .uri(STATUS_PATH)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_method_keeps_route_opt_out() {
        let response = send(
            router(GateConfig::default()),
            post_json(HEALTH_PATH).body(Body::empty()).unwrap(),
        )
        .await;

        // The XSRF opt-out on /health still applies, so the router answers 405
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key("kbn-name"));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_decorated_404() {
        let response = send(
            router(GateConfig::default()),
            post_json("/nowhere").body(Body::empty()).unwrap(),
        )
        .await;

        // Unmatched routes skip the pre-routing checks
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("kbn-name"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = send(
            router(GateConfig::default()),
            post_json(ECHO_PATH)
                .header(XSRF_HEADER, "true")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Malformed JSON in request body");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = send(
            router(GateConfig::default()),
            Request::builder()
                .uri(HEALTH_PATH)
                .header("x-request-id", "corr-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.headers()["x-request-id"], "corr-123");
    }
}
