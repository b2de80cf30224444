//! Tower layers driving the [`AdmissionGate`].

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::gate::{AdmissionGate, GateRequest, RouteTable};
use crate::metrics;

/// Runs the gate's pre-routing checks for matched routes.
///
/// Must be installed with `Router::route_layer` so that [`MatchedPath`] is
/// available.
#[derive(Clone)]
pub struct PreRoutingLayer {
    gate: Arc<AdmissionGate>,
    routes: Arc<RouteTable>,
}

impl PreRoutingLayer {
    pub fn new(gate: Arc<AdmissionGate>, routes: Arc<RouteTable>) -> Self {
        Self { gate, routes }
    }
}

impl<S> Layer<S> for PreRoutingLayer {
    type Service = PreRoutingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PreRoutingService {
            inner,
            gate: self.gate.clone(),
            routes: self.routes.clone(),
        }
    }
}

/// Pre-routing check service wrapper.
#[derive(Clone)]
pub struct PreRoutingService<S> {
    inner: S,
    gate: Arc<AdmissionGate>,
    routes: Arc<RouteTable>,
}

impl<S> Service<Request<Body>> for PreRoutingService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let started = Instant::now();

        let route = self.routes.resolve(
            req.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
            req.method(),
            req.uri().path(),
        );
        let admission = self.gate.run_pre_checks(&GateRequest::new(
            req.method(),
            req.uri().path(),
            req.headers(),
            &route,
        ));
        metrics::record_pre_checks_duration(started.elapsed().as_secs_f64());

        let extra_headers = match admission {
            Ok(headers) => headers,
            Err(rejection) => {
                warn!(
                    reason = rejection.reason(),
                    path = %req.uri().path(),
                    method = %req.method(),
                    route = %route.path,
                    "Request rejected by admission gate"
                );
                metrics::record_request_rejected(rejection.reason());
                return Box::pin(async move { Ok::<_, S::Error>(rejection.into_response()) });
            }
        };

        debug!(route = %route.path, access = ?route.access, "Request admitted");
        metrics::record_request_admitted();

        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            for (name, value) in extra_headers.iter() {
                response.headers_mut().insert(name.clone(), value.clone());
            }
            Ok(response)
        })
    }
}

/// Applies the gate's response transforms to every response.
#[derive(Clone)]
pub struct ResponseHeadersLayer {
    gate: Arc<AdmissionGate>,
}

impl ResponseHeadersLayer {
    pub fn new(gate: Arc<AdmissionGate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for ResponseHeadersLayer {
    type Service = ResponseHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseHeadersService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Response header service wrapper.
#[derive(Clone)]
pub struct ResponseHeadersService<S> {
    inner: S,
    gate: Arc<AdmissionGate>,
}

impl<S> Service<Request<Body>> for ResponseHeadersService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let started = Instant::now();
        let method = req.method().clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            gate.apply_response_transforms(response.headers_mut());

            metrics::record_request_duration(
                method.as_str(),
                response.status().as_str(),
                started.elapsed().as_secs_f64(),
            );

            Ok(response)
        })
    }
}
