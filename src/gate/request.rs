//! Request and route descriptions consumed by the gate.

use std::borrow::Cow;

use axum::http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};

/// Header carrying the client bundle version.
pub const VERSION_HEADER: &str = "kbn-version";

/// Header marking a request as XSRF-safe (content ignored).
pub const XSRF_HEADER: &str = "kbn-xsrf";

/// Response header carrying the configured server name.
pub const NAME_HEADER: &str = "kbn-name";

/// Header marking a request as originating from the product's own front end.
pub const INTERNAL_ORIGIN_HEADER: &str = "x-elastic-internal-origin";

/// Audience of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAccess {
    /// Stable API available to any caller
    #[default]
    Public,
    /// Endpoint meant only for the product's own front end
    Internal,
}

/// Route metadata declared at registration time.
///
/// # Example
///
/// ```rust
/// use admission_gate::gate::{RouteAccess, RouteConfig};
/// use axum::http::Method;
///
/// let route = RouteConfig::new("/internal/echo")
///     .method(Method::POST)
///     .internal();
///
/// assert_eq!(route.access, RouteAccess::Internal);
/// assert!(route.xsrf_required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Route template as registered with the router (e.g. `/api/items/{id}`)
    pub path: String,
    /// Declared methods; empty means any method
    pub methods: Vec<Method>,
    pub access: RouteAccess,
    pub xsrf_required: bool,
}

impl RouteConfig {
    /// Public route requiring XSRF protection, accepting any method.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            access: RouteAccess::Public,
            xsrf_required: true,
        }
    }

    /// Add a declared method.
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn access(mut self, access: RouteAccess) -> Self {
        self.access = access;
        self
    }

    /// Shorthand for `access(RouteAccess::Internal)`.
    pub fn internal(self) -> Self {
        self.access(RouteAccess::Internal)
    }

    pub fn xsrf_required(mut self, required: bool) -> Self {
        self.xsrf_required = required;
        self
    }

    /// Whether this declaration covers `method`. A GET declaration also
    /// covers HEAD, as the router serves HEAD from GET handlers.
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.is_empty()
            || self.methods.contains(method)
            || (*method == Method::HEAD && self.methods.contains(&Method::GET))
    }

    pub fn is_internal(&self) -> bool {
        self.access == RouteAccess::Internal
    }
}

/// Read-only view of an inbound request as seen by the pre-routing checks.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    method: &'a Method,
    path: &'a str,
    headers: &'a HeaderMap,
    route: &'a RouteConfig,
}

impl<'a> GateRequest<'a> {
    pub fn new(
        method: &'a Method,
        path: &'a str,
        headers: &'a HeaderMap,
        route: &'a RouteConfig,
    ) -> Self {
        Self {
            method,
            path,
            headers,
            route,
        }
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    /// Request path (not the route template).
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    pub fn route(&self) -> &'a RouteConfig {
        self.route
    }

    /// Header presence, regardless of value.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Header value, lossily decoded. Repeated headers are joined with `", "`.
    pub fn header_str(&self, name: &str) -> Option<Cow<'a, str>> {
        let mut values = self.headers.get_all(name).iter();
        let first = String::from_utf8_lossy(values.next()?.as_bytes());

        let mut rest = values.peekable();
        if rest.peek().is_none() {
            return Some(first);
        }

        let mut joined = first.into_owned();
        for value in rest {
            joined.push_str(", ");
            joined.push_str(&String::from_utf8_lossy(value.as_bytes()));
        }
        Some(Cow::Owned(joined))
    }

    pub fn is_safe_method(&self) -> bool {
        is_safe_method(self.method)
    }
}

/// GET, HEAD and OPTIONS carry no side effects.
pub fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}
