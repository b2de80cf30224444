//! # Admission Gate
//!
//! An Axum service fronted by a request admission gate:
//!
//! - **XSRF check**: state-changing requests must carry `kbn-xsrf` or `kbn-version`
//! - **Version check**: stale clients sending an outdated `kbn-version` are rejected
//! - **Internal-route restriction**: internal endpoints require the internal-origin header
//! - **Header injection**: security, custom, CSP and `kbn-name` headers on every response
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Request ID → Response Headers → Trace → Body Limit         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Router → Pre-routing checks (XSRF → Version → Internal)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, status, echo)                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use admission_gate::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let app = build_router(AppState::new(config))?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Gate Configuration
//!
//! ```bash
//! RESTRICT_INTERNAL_APIS=true XSRF_ALLOWLIST=/api/webhook cargo run
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::{Config, GateConfig};
pub use error::{AppError, AppResult};
pub use gate::{AdmissionGate, Rejection, RouteConfig, Verdict};
pub use routes::build_router;
pub use state::AppState;
