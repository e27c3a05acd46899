//! Request matching.
//!
//! This module provides the [`Router`], which matches a verb and a path
//! against a [`Schema`] and binds the extracted parameters.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, Uri};
use meridian_core::{normalize_path, HandlerRef};
use tracing::{debug, info};

use crate::endpoint::{Endpoint, Schema};
use crate::error::RoutingError;
use crate::params::Params;

/// A request matched to exactly one endpoint.
///
/// Inserted into the request extensions by the dispatch kernel; this is
/// what a "bound request" carries.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched endpoint.
    pub endpoint: Arc<Endpoint>,
    /// Values captured from the path, in mask order.
    pub path_params: Params,
    /// Decoded query string pairs, in query order.
    pub query_params: Params,
}

impl RouteMatch {
    /// Returns the handler of the matched endpoint.
    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.endpoint.handler
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Returns the first query parameter with this name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name)
    }
}

/// Matches requests against a schema.
///
/// Endpoints are tried in schema order. A path match with a disallowed verb
/// is remembered and scanning continues, since another endpoint may accept
/// the same path with that verb. If nothing accepts the verb, the last
/// remembered conflict is reported as [`RoutingError::MethodNotAllowed`];
/// if no path matched at all the result is `Ok(None)`.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use meridian_core::HandlerRef;
/// use meridian_router::{Endpoint, PathPattern, Router, Schema};
///
/// let schema = Schema::new(vec![Endpoint::new(
///     HandlerRef::new("UserController", "show"),
///     vec![Method::GET],
///     PathPattern::compile("/users/{id}").unwrap(),
/// )]);
/// let router = Router::new(schema);
///
/// let matched = router.match_route(&Method::GET, "/users/42/").unwrap().unwrap();
/// assert_eq!(matched.path_param("id"), Some("42"));
///
/// assert!(router.match_route(&Method::GET, "/teams").unwrap().is_none());
/// assert!(router.match_route(&Method::DELETE, "/users/42").is_err());
/// ```
///
/// # Static index
///
/// [`Router::with_index`] precomputes a lookup from static masks to
/// endpoints so that static paths skip the linear scan. Static masks are
/// always tried before variable ones, which is the order the hierarchy
/// sorter produces for serialized schemas anyway.
#[derive(Debug, Clone, Default)]
pub struct Router {
    schema: Schema,
    index: Option<StaticIndex>,
}

#[derive(Debug, Clone, Default)]
struct StaticIndex {
    by_mask: HashMap<String, Vec<usize>>,
    variable: Vec<usize>,
}

impl StaticIndex {
    fn build(schema: &Schema) -> Self {
        let mut index = Self::default();
        for (position, endpoint) in schema.iter().enumerate() {
            if endpoint.pattern.is_static() {
                index
                    .by_mask
                    .entry(endpoint.mask().to_string())
                    .or_default()
                    .push(position);
            } else {
                index.variable.push(position);
            }
        }
        index
    }
}

impl Router {
    /// Creates a router that scans the schema linearly.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        info!(
            endpoints = schema.len(),
            indexed = false,
            "Routing table loaded"
        );
        Self {
            schema,
            index: None,
        }
    }

    /// Creates a router with a static-mask index.
    #[must_use]
    pub fn with_index(schema: Schema) -> Self {
        let index = StaticIndex::build(&schema);
        info!(
            endpoints = schema.len(),
            static_masks = index.by_mask.len(),
            variable_endpoints = index.variable.len(),
            indexed = true,
            "Routing table loaded"
        );
        Self {
            schema,
            index: Some(index),
        }
    }

    /// Returns the schema this router matches against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns true if the static index is in use.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Matches a verb and path.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::MethodNotAllowed`] when the path matched but
    /// the verb did not.
    pub fn match_route(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<Option<RouteMatch>, RoutingError> {
        self.match_request(method, path, None)
    }

    /// Matches a verb, path and optional raw query string.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::MethodNotAllowed`] as for
    /// [`match_route`](Self::match_route), or
    /// [`RoutingError::MalformedQuery`] when the query cannot be decoded.
    pub fn match_request(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<Option<RouteMatch>, RoutingError> {
        let path = normalize_path(path);
        let Some((position, path_params)) = self.find(method, &path)? else {
            debug!(method = %method, path = %path, "No endpoint matched");
            return Ok(None);
        };

        let query_params = match query {
            Some(query) if !query.is_empty() => {
                serde_urlencoded::from_str::<Vec<(String, String)>>(query)?
                    .into_iter()
                    .collect()
            }
            _ => Params::new(),
        };

        let Some(endpoint) = self.schema.get(position) else {
            return Ok(None);
        };
        debug!(
            method = %method,
            path = %path,
            endpoint = %endpoint.id,
            handler = %endpoint.handler,
            "Route matched"
        );

        Ok(Some(RouteMatch {
            endpoint: Arc::clone(endpoint),
            path_params,
            query_params,
        }))
    }

    /// Matches a verb and a full request URI.
    ///
    /// # Errors
    ///
    /// See [`match_request`](Self::match_request).
    pub fn match_uri(&self, method: &Method, uri: &Uri) -> Result<Option<RouteMatch>, RoutingError> {
        self.match_request(method, uri.path(), uri.query())
    }

    /// Returns every verb allowed by some endpoint whose mask matches the path.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let path = normalize_path(path);
        let mut methods: Vec<Method> = self
            .schema
            .iter()
            .filter(|e| e.pattern.is_match(&path))
            .flat_map(|e| e.methods.iter().cloned())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods.dedup();
        methods
    }

    fn find(&self, method: &Method, path: &str) -> Result<Option<(usize, Params)>, RoutingError> {
        let mut conflict = None;
        let hit = match &self.index {
            Some(index) => {
                let statics = index.by_mask.get(path).into_iter().flatten().copied();
                let candidates = statics.chain(index.variable.iter().copied());
                self.scan(candidates, method, path, &mut conflict)
            }
            None => self.scan(0..self.schema.len(), method, path, &mut conflict),
        };

        if hit.is_some() {
            return Ok(hit);
        }

        match conflict.and_then(|position| self.schema.get(position)) {
            Some(endpoint) => {
                debug!(method = %method, mask = %endpoint.mask(), "Method not allowed");
                Err(RoutingError::MethodNotAllowed {
                    mask: endpoint.mask().to_string(),
                    method: method.as_str().to_string(),
                })
            }
            None => Ok(None),
        }
    }

    fn scan(
        &self,
        candidates: impl Iterator<Item = usize>,
        method: &Method,
        path: &str,
        conflict: &mut Option<usize>,
    ) -> Option<(usize, Params)> {
        for position in candidates {
            let Some(endpoint) = self.schema.get(position) else {
                continue;
            };
            let Some(params) = endpoint.pattern.match_path(path) else {
                continue;
            };
            if endpoint.allows(method) {
                return Some((position, params));
            }
            // last conflict wins
            *conflict = Some(position);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PathPattern;

    fn endpoint(method: &str, methods: &[Method], mask: &str) -> Endpoint {
        let mut e = Endpoint::new(
            HandlerRef::new("TestController", method),
            methods.to_vec(),
            PathPattern::compile(mask).unwrap(),
        );
        e.id = method.to_string();
        e
    }

    fn both(endpoints: Vec<Endpoint>) -> [Router; 2] {
        let schema = Schema::new(endpoints);
        [Router::new(schema.clone()), Router::with_index(schema)]
    }

    #[test]
    fn test_router_empty() {
        let router = Router::default();
        assert!(router.match_route(&Method::GET, "/").unwrap().is_none());
        assert!(!router.is_indexed());
    }

    #[test]
    fn test_router_match_static() {
        for router in both(vec![endpoint("list", &[Method::GET], "/users")]) {
            let m = router.match_route(&Method::GET, "/users").unwrap().unwrap();
            assert_eq!(m.endpoint.id, "list");
            assert!(m.path_params.is_empty());
        }
    }

    #[test]
    fn test_router_normalizes_request_path() {
        for router in both(vec![endpoint("list", &[Method::GET], "/a/b")]) {
            assert!(router.match_route(&Method::GET, "//a//b/").unwrap().is_some());
        }
    }

    #[test]
    fn test_router_root_path() {
        for router in both(vec![endpoint("root", &[Method::GET], "/")]) {
            let m = router.match_route(&Method::GET, "").unwrap().unwrap();
            assert_eq!(m.endpoint.id, "root");
        }
    }

    #[test]
    fn test_router_concrete_order_items() {
        for router in both(vec![endpoint(
            "items",
            &[Method::GET],
            "orders/{orderId}/items",
        )]) {
            let m = router
                .match_route(&Method::GET, "/orders/42/items")
                .unwrap()
                .unwrap();
            assert_eq!(m.path_param("orderId"), Some("42"));
            assert_eq!(m.path_params.len(), 1);
        }
    }

    #[test]
    fn test_router_method_not_allowed_vs_no_match() {
        for router in both(vec![endpoint("create", &[Method::POST], "/items")]) {
            match router.match_route(&Method::GET, "/items") {
                Err(RoutingError::MethodNotAllowed { mask, method }) => {
                    assert_eq!(mask, "/items");
                    assert_eq!(method, "GET");
                }
                other => panic!("expected method not allowed, got {other:?}"),
            }
            assert!(router.match_route(&Method::GET, "/missing").unwrap().is_none());
        }
    }

    #[test]
    fn test_router_keeps_scanning_after_verb_conflict() {
        for router in both(vec![
            endpoint("update", &[Method::PUT], "/items/{id}"),
            endpoint("show", &[Method::GET], "/items/{id}"),
        ]) {
            let m = router.match_route(&Method::GET, "/items/7").unwrap().unwrap();
            assert_eq!(m.endpoint.id, "show");
        }
    }

    #[test]
    fn test_router_last_conflict_wins() {
        for router in both(vec![
            endpoint("update", &[Method::PUT], "/items/{id}"),
            endpoint("rename", &[Method::PATCH], "/items/{name}"),
        ]) {
            match router.match_route(&Method::GET, "/items/7") {
                Err(RoutingError::MethodNotAllowed { mask, .. }) => {
                    assert_eq!(mask, "/items/{name}");
                }
                other => panic!("expected method not allowed, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_indexed_router_prefers_static_in_any_order() {
        let endpoints = || {
            vec![
                endpoint("show", &[Method::GET], "/users/{id}"),
                endpoint("export", &[Method::GET], "/users/export"),
            ]
        };
        let forward = Router::with_index(Schema::new(endpoints()));
        let mut reversed_endpoints = endpoints();
        reversed_endpoints.reverse();
        let reversed = Router::with_index(Schema::new(reversed_endpoints));

        for router in [forward, reversed] {
            let m = router
                .match_route(&Method::GET, "/users/export")
                .unwrap()
                .unwrap();
            assert_eq!(m.endpoint.id, "export");

            let m = router.match_route(&Method::GET, "/users/9").unwrap().unwrap();
            assert_eq!(m.endpoint.id, "show");
        }
    }

    #[test]
    fn test_router_binds_query_params() {
        for router in both(vec![endpoint("search", &[Method::GET], "/search")]) {
            let m = router
                .match_request(&Method::GET, "/search", Some("q=rust+router&page=2&page=3"))
                .unwrap()
                .unwrap();
            assert_eq!(m.query_param("q"), Some("rust router"));
            assert_eq!(
                m.query_params.get_all("page").collect::<Vec<_>>(),
                vec!["2", "3"]
            );
        }
    }

    #[test]
    fn test_router_match_uri() {
        for router in both(vec![endpoint("show", &[Method::GET], "/users/{id}")]) {
            let uri: Uri = "/users/5?expand=teams".parse().unwrap();
            let m = router.match_uri(&Method::GET, &uri).unwrap().unwrap();
            assert_eq!(m.path_param("id"), Some("5"));
            assert_eq!(m.query_param("expand"), Some("teams"));
        }
    }

    #[test]
    fn test_allowed_methods() {
        let [router, _] = both(vec![
            endpoint("show", &[Method::GET], "/items/{id}"),
            endpoint("update", &[Method::PUT, Method::PATCH], "/items/{id}"),
            endpoint("create", &[Method::POST], "/items"),
        ]);
        assert_eq!(
            router.allowed_methods("/items/3"),
            vec![Method::GET, Method::PATCH, Method::PUT]
        );
        assert!(router.allowed_methods("/nothing").is_empty());
    }
}
