//! Path pattern compiler and request router for Meridian.
//!
//! This crate turns path templates into anchored patterns and matches
//! incoming requests against an ordered [`Schema`] of endpoints.
//!
//! # Features
//!
//! - **Pattern Compilation**: `/orders/{orderId}` becomes an anchored regex with named captures
//! - **Ordered Matching**: endpoints are tried in schema order, statics first when indexed
//! - **405 Detection**: a path match with a disallowed verb is reported, not dropped
//! - **Parameter Binding**: path captures and decoded query pairs travel with the match
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use meridian_core::HandlerRef;
//! use meridian_router::{Endpoint, PathPattern, Router, Schema};
//!
//! let schema: Schema = vec![
//!     Endpoint::new(
//!         HandlerRef::new("OrderController", "items"),
//!         vec![Method::GET],
//!         PathPattern::compile("/orders/{orderId}/items").unwrap(),
//!     ),
//!     Endpoint::new(
//!         HandlerRef::new("OrderController", "create"),
//!         vec![Method::POST],
//!         PathPattern::compile("/orders").unwrap(),
//!     ),
//! ]
//! .into_iter()
//! .collect();
//!
//! let router = Router::with_index(schema);
//!
//! let matched = router
//!     .match_route(&Method::GET, "/orders/42/items")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(matched.handler().method, "items");
//! assert_eq!(matched.path_param("orderId"), Some("42"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!   template ──► PathPattern::compile ──► Endpoint ──► Schema
//!                                                        │
//!   (method, path, query) ──► Router::match_request ◄────┘
//!                                   │
//!                   ┌───────────────┼────────────────┐
//!                   ▼               ▼                ▼
//!           Ok(Some(RouteMatch))  Ok(None)   Err(MethodNotAllowed)
//! ```

#![doc(html_root_url = "https://docs.rs/meridian-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod error;
mod params;
mod pattern;
mod router;

pub use endpoint::{verb_key, Endpoint, ParameterSpec, RequestBodySpec, ResponseSpec, Schema};
pub use error::{PatternError, RoutingError};
pub use params::Params;
pub use pattern::{is_variable_segment, placeholder_names, PathPattern};
pub use router::{RouteMatch, Router};

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use meridian_core::HandlerRef;

    fn endpoint(method: &str, methods: Vec<Method>, mask: &str) -> Endpoint {
        Endpoint::new(
            HandlerRef::new("UserController", method),
            methods,
            PathPattern::compile(mask).unwrap(),
        )
    }

    #[test]
    fn test_basic_routing() {
        let router = Router::new(Schema::new(vec![
            endpoint("list", vec![Method::GET], "/users"),
            endpoint("show", vec![Method::GET], "/users/{id}"),
        ]));

        let m = router.match_route(&Method::GET, "/users").unwrap().unwrap();
        assert_eq!(m.handler().method, "list");
        assert!(m.path_params.is_empty());

        let m = router.match_route(&Method::GET, "/users/123").unwrap().unwrap();
        assert_eq!(m.handler().method, "show");
        assert_eq!(m.path_param("id"), Some("123"));
    }

    #[test]
    fn test_method_routing() {
        let router = Router::with_index(Schema::new(vec![
            endpoint("list", vec![Method::GET], "/users"),
            endpoint("create", vec![Method::POST], "/users"),
        ]));

        let m = router.match_route(&Method::GET, "/users").unwrap().unwrap();
        assert_eq!(m.handler().method, "list");

        let m = router.match_route(&Method::POST, "/users").unwrap().unwrap();
        assert_eq!(m.handler().method, "create");

        assert!(matches!(
            router.match_route(&Method::DELETE, "/users"),
            Err(RoutingError::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn test_multiple_params() {
        let router = Router::new(Schema::new(vec![endpoint(
            "orgUser",
            vec![Method::GET],
            "/orgs/{orgId}/users/{userId}",
        )]));

        let m = router
            .match_route(&Method::GET, "/orgs/acme/users/123")
            .unwrap()
            .unwrap();
        assert_eq!(m.path_param("orgId"), Some("acme"));
        assert_eq!(m.path_param("userId"), Some("123"));
    }
}
