//! HTTP middleware wiring the admission gate into the Axum stack.
//!
//! # Architecture
//!
//! ```text
//! Request → Request ID → Response Headers → Trace → Router → Pre-routing checks → Handler
//!                              ↑                                   ↓
//!                     security/custom/CSP/kbn-name          400 Bad Request
//! ```
//!
//! The pre-routing layer is installed with `Router::route_layer`, so it runs
//! after route matching and sees the matched route template. The response
//! header layer wraps the whole router and therefore also decorates
//! rejections and 404 responses.

pub mod gate;

pub use gate::{PreRoutingLayer, ResponseHeadersLayer};
