//! Endpoint handlers and their resolution.
//!
//! Endpoints name their handler by [`HandlerRef`]; a [`HandlerResolver`] maps
//! that pair to something invocable. [`HandlerRegistry`] is the in-memory
//! resolver.

use std::collections::HashMap;
use std::sync::Arc;

use meridian_core::{HandlerRef, MeridianResult};

use crate::middleware::BoxFuture;
use crate::types::{Request, Response};

/// Code that serves a matched endpoint.
///
/// The request carries the [`RouteMatch`](meridian_router::RouteMatch) in its
/// extensions.
pub trait EndpointHandler: Send + Sync + 'static {
    /// Serves the request.
    fn call<'a>(
        &'a self,
        request: &'a Request,
        response: Response,
    ) -> BoxFuture<'a, MeridianResult<Response>>;
}

/// An endpoint handler built from a closure.
///
/// ```ignore
/// let show = FnHandler::new(|request, response| {
///     Box::pin(async move {
///         let id = request.extensions().get::<RouteMatch>().and_then(|m| m.path_param("id"));
///         Ok(response)
///     })
/// });
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: for<'a> Fn(&'a Request, Response) -> BoxFuture<'a, MeridianResult<Response>>
        + Send
        + Sync
        + 'static,
{
    /// Wraps a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> EndpointHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a Request, Response) -> BoxFuture<'a, MeridianResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        request: &'a Request,
        response: Response,
    ) -> BoxFuture<'a, MeridianResult<Response>> {
        (self.func)(request, response)
    }
}

/// Maps a handler reference to an invocable handler.
pub trait HandlerResolver: Send + Sync + 'static {
    /// Returns the handler for `handler`, if one is known.
    fn resolve(&self, handler: &HandlerRef) -> Option<Arc<dyn EndpointHandler>>;
}

/// A resolver backed by a map.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerRef, Arc<dyn EndpointHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `class::method`, replacing any previous one.
    pub fn register<H: EndpointHandler>(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.handlers
            .insert(HandlerRef::new(class, method), Arc::new(handler));
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<H: EndpointHandler>(
        mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        handler: H,
    ) -> Self {
        self.register(class, method, handler);
        self
    }

    /// Returns true if a handler is registered for `handler`.
    #[must_use]
    pub fn contains(&self, handler: &HandlerRef) -> bool {
        self.handlers.contains_key(handler)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(&self, handler: &HandlerRef) -> Option<Arc<dyn EndpointHandler>> {
        self.handlers.get(handler).cloned()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().map(ToString::to_string).collect();
        handlers.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &handlers)
            .finish()
    }
}
