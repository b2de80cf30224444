//! Route metadata lookup.
//!
//! The router only knows handlers; access and XSRF requirements are declared
//! here once at startup and looked up by the matched route template.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use super::request::RouteConfig;

/// Immutable table of declared routes keyed by route template.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Vec<Arc<RouteConfig>>>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = RouteConfig>) -> Self {
        let mut table: HashMap<String, Vec<Arc<RouteConfig>>> = HashMap::new();
        for route in routes {
            table
                .entry(route.path.clone())
                .or_default()
                .push(Arc::new(route));
        }
        Self { routes: table }
    }

    /// Find the declaration covering `method` on the route template `path`.
    pub fn get(&self, path: &str, method: &Method) -> Option<Arc<RouteConfig>> {
        self.routes
            .get(path)?
            .iter()
            .find(|route| route.accepts(method))
            .cloned()
    }

    /// Resolve the route for a request.
    ///
    /// A declared template whose declarations don't cover `method` resolves
    /// to its first declaration, so its access rules still apply to methods
    /// the router answers on its own (HEAD, 405).
    ///
    /// Undeclared routes get a public, XSRF-protected default keyed by the
    /// matched template, or by the raw path when routing did not match.
    pub fn resolve(
        &self,
        matched_path: Option<&str>,
        method: &Method,
        request_path: &str,
    ) -> Arc<RouteConfig> {
        let path = matched_path.unwrap_or(request_path);
        self.routes
            .get(path)
            .and_then(|declared| {
                declared
                    .iter()
                    .find(|route| route.accepts(method))
                    .or_else(|| declared.first())
            })
            .cloned()
            .unwrap_or_else(|| Arc::new(RouteConfig::new(path)))
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteConfig> {
        self.routes.values().flatten().map(|route| &**route)
    }

    /// Templates of routes restricted to internal callers.
    pub fn internal_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .iter()
            .filter(|route| route.is_internal())
            .map(|route| route.path.as_str())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gate::RouteAccess;

    fn table() -> RouteTable {
        RouteTable::new([
            RouteConfig::new("/api/items").method(Method::GET),
            RouteConfig::new("/api/items").method(Method::POST).internal(),
            RouteConfig::new("/health").xsrf_required(false),
        ])
    }

    #[test]
    fn test_lookup_by_method() {
        let table = table();

        let get = table.get("/api/items", &Method::GET).unwrap();
        assert_eq!(get.access, RouteAccess::Public);

        let post = table.get("/api/items", &Method::POST).unwrap();
        assert_eq!(post.access, RouteAccess::Internal);

        assert!(table.get("/api/items", &Method::DELETE).is_none());
    }

    #[test]
    fn test_any_method_declaration() {
        let table = table();
        let route = table.get("/health", &Method::PATCH).unwrap();
        assert!(!route.xsrf_required);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let table = table();
        let route = table.resolve(Some("/api/other/{id}"), &Method::POST, "/api/other/1");

        assert_eq!(route.path, "/api/other/{id}");
        assert_eq!(route.access, RouteAccess::Public);
        assert!(route.xsrf_required);
    }

    #[test]
    fn test_resolve_undeclared_method_keeps_template_rules() {
        let table = RouteTable::new([
            RouteConfig::new("/internal/data").method(Method::GET).internal(),
            RouteConfig::new("/health").method(Method::GET).xsrf_required(false),
        ]);

        let route = table.resolve(Some("/internal/data"), &Method::DELETE, "/internal/data");
        assert!(route.is_internal());

        let route = table.resolve(Some("/health"), &Method::POST, "/health");
        assert!(!route.xsrf_required);
    }

    #[test]
    fn test_get_declaration_covers_head() {
        let table = RouteTable::new([RouteConfig::new("/internal/data")
            .method(Method::GET)
            .internal()]);

        let route = table.get("/internal/data", &Method::HEAD).unwrap();
        assert!(route.is_internal());
    }

    #[test]
    fn test_internal_paths() {
        assert_eq!(table().internal_paths(), vec!["/api/items"]);
    }

    #[test]
    fn test_resolve_without_matched_path_uses_request_path() {
        let route = RouteTable::default().resolve(None, &Method::GET, "/missing");
        assert_eq!(route.path, "/missing");
    }

    #[test]
    fn test_len() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.iter().count(), 3);
    }
}
