//! Request dispatch.
//!
//! ```text
//! handle(request)
//!   │
//!   ├─ route ──► none ──► NotFound ─────────────┐
//!   │        └─► wrong verb ──► MethodNotAllowed┤
//!   │                                           │
//!   └─ bind RouteMatch ──► chain                │
//!        m[0] ─► ... ─► dispatcher ─► handler   │
//!                                           │   │
//!                     Ok(response) ◄────────┤   ▼
//!                                   Err ──► ErrorHandler::handle
//!                                              │ Err
//!                                              ▼
//!                                         handle_fatal
//!   finalize (HEAD body, Allow, metrics) ◄─────┘
//! ```
//!
//! With error catching off, any error skips both handler tiers and is returned
//! to the caller.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use http_body_util::Full;
use meridian_core::{MeridianError, MeridianResult};
use meridian_router::{RouteMatch, Router};
use meridian_telemetry::metrics::{self, InFlightGuard, Outcome};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::chain::{BoxedMiddleware, ChainBuilder, ChainError, MiddlewareChain};
use crate::decorator::{
    Decorated, DecoratorManager, ErrorDecorator, RequestDecorator, ResponseDecorator,
};
use crate::error_handler::{DefaultErrorHandler, ErrorHandler};
use crate::handler::HandlerResolver;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, RequestHead, Response, ResponseExt};

/// Priority of the endpoint dispatcher stage; it always runs last.
pub const DISPATCHER_PRIORITY: i32 = i32::MAX;

/// Errors raised while building a [`Kernel`].
#[derive(Debug, Error)]
pub enum KernelError {
    /// No router was supplied.
    #[error("kernel requires a router")]
    MissingRouter,

    /// No handler resolver was supplied.
    #[error("kernel requires a handler resolver")]
    MissingResolver,

    /// The middleware chain could not be built.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// The final chain stage: decorators around the endpoint handler.
struct EndpointDispatcher {
    resolver: Arc<dyn HandlerResolver>,
    decorators: DecoratorManager,
}

impl Middleware for EndpointDispatcher {
    fn name(&self) -> &'static str {
        "dispatcher"
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, MeridianResult<Response>> {
        Box::pin(async move {
            let request = match self.decorators.decorate_request(request)? {
                Decorated::Continue(request) => request,
                Decorated::ShortCircuit(response) => {
                    debug!(
                        status = response.status().as_u16(),
                        "Request decorator short-circuited dispatch"
                    );
                    return Ok(response);
                }
            };

            let handler_ref = request
                .extensions()
                .get::<RouteMatch>()
                .map(|route| route.handler().clone())
                .ok_or_else(|| MeridianError::internal("request reached dispatch unrouted"))?;
            let handler = self
                .resolver
                .resolve(&handler_ref)
                .ok_or_else(|| MeridianError::UnresolvedHandler {
                    handler: handler_ref.clone(),
                })?;

            debug!(handler = %handler_ref, "Invoking endpoint handler");
            let response = match handler.call(&request, response).await {
                Ok(response) => self.decorators.decorate_response(&request, response)?,
                Err(error) => match self.decorators.decorate_error(&request, &error) {
                    Some(recovered) => recovered?,
                    None => return Err(error),
                },
            };

            next.run(request, response).await
        })
    }
}

/// Builder for a [`Kernel`].
///
/// # Example
///
/// ```ignore
/// let kernel = Kernel::builder()
///     .router(Router::with_index(schema))
///     .resolver(registry)
///     .middleware_with_priority(auth, 10)
///     .debug(cfg!(debug_assertions))
///     .build()?;
/// ```
pub struct KernelBuilder {
    router: Option<Router>,
    resolver: Option<Arc<dyn HandlerResolver>>,
    chain: ChainBuilder,
    decorators: DecoratorManager,
    error_handler: Box<dyn ErrorHandler>,
    catch_errors: bool,
    debug: bool,
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self {
            router: None,
            resolver: None,
            chain: ChainBuilder::new(),
            decorators: DecoratorManager::new(),
            error_handler: Box::new(DefaultErrorHandler::new()),
            catch_errors: true,
            debug: false,
        }
    }
}

impl KernelBuilder {
    /// Creates a builder with error catching on and debug mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the handler resolver.
    #[must_use]
    pub fn resolver<R: HandlerResolver>(self, resolver: R) -> Self {
        self.shared_resolver(Arc::new(resolver))
    }

    /// Sets an already shared handler resolver.
    #[must_use]
    pub fn shared_resolver(mut self, resolver: Arc<dyn HandlerResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Adds a middleware at the default priority.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.chain = self.chain.add(middleware);
        self
    }

    /// Adds a middleware at the given priority.
    #[must_use]
    pub fn middleware_with_priority<M: Middleware>(mut self, middleware: M, priority: i32) -> Self {
        self.chain = self.chain.add_with_priority(middleware, priority);
        self
    }

    /// Adds an already shared middleware at the given priority.
    #[must_use]
    pub fn shared_middleware(mut self, middleware: BoxedMiddleware, priority: i32) -> Self {
        self.chain = self.chain.add_boxed(middleware, priority);
        self
    }

    /// Appends a request decorator.
    #[must_use]
    pub fn request_decorator<D: RequestDecorator>(mut self, decorator: D) -> Self {
        self.decorators.add_request_decorator(decorator);
        self
    }

    /// Appends a response decorator.
    #[must_use]
    pub fn response_decorator<D: ResponseDecorator>(mut self, decorator: D) -> Self {
        self.decorators.add_response_decorator(decorator);
        self
    }

    /// Appends an error decorator.
    #[must_use]
    pub fn error_decorator<D: ErrorDecorator>(mut self, decorator: D) -> Self {
        self.decorators.add_error_decorator(decorator);
        self
    }

    /// Replaces all decorators.
    #[must_use]
    pub fn decorators(mut self, decorators: DecoratorManager) -> Self {
        self.decorators = decorators;
        self
    }

    /// Replaces the error handler.
    #[must_use]
    pub fn error_handler<H: ErrorHandler>(mut self, handler: H) -> Self {
        self.error_handler = Box::new(handler);
        self
    }

    /// Enables or disables error catching.
    #[must_use]
    pub fn catch_errors(mut self, catch_errors: bool) -> Self {
        self.catch_errors = catch_errors;
        self
    }

    /// Enables or disables debug output in error responses.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Freezes the kernel.
    ///
    /// The endpoint dispatcher is appended as the last chain stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the router or resolver is missing.
    pub fn build(self) -> Result<Kernel, KernelError> {
        let router = self.router.ok_or(KernelError::MissingRouter)?;
        let resolver = self.resolver.ok_or(KernelError::MissingResolver)?;

        let dispatcher = EndpointDispatcher {
            resolver,
            decorators: self.decorators,
        };
        let chain = self
            .chain
            .add_with_priority(dispatcher, DISPATCHER_PRIORITY)
            .build()?;

        let mut error_handler = self.error_handler;
        error_handler.set_debug_mode(self.debug);

        info!(
            endpoints = router.schema().len(),
            indexed = router.is_indexed(),
            stages = ?chain.names(),
            catch_errors = self.catch_errors,
            debug = self.debug,
            "Kernel built"
        );

        Ok(Kernel {
            router,
            chain,
            error_handler,
            catch_errors: self.catch_errors,
        })
    }
}

/// Routes requests and runs them through the middleware chain.
///
/// Built once, then shared across tasks; nothing in it changes while serving.
pub struct Kernel {
    router: Router,
    chain: MiddlewareChain,
    error_handler: Box<dyn ErrorHandler>,
    catch_errors: bool,
}

impl Kernel {
    /// Creates a new kernel builder.
    #[must_use]
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the chain stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Returns whether errors are turned into responses.
    #[must_use]
    pub fn catches_errors(&self) -> bool {
        self.catch_errors
    }

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Only when error catching is off; the error is the one raised by
    /// routing or by the chain.
    pub async fn handle(&self, request: Request) -> MeridianResult<Response> {
        let span = info_span!(
            "dispatch",
            method = %request.method(),
            path = %request.uri().path()
        );
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: Request) -> MeridianResult<Response> {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();
        let mut head = RequestHead::from_request(&request);

        match self.dispatch(request, &mut head).await {
            Ok(response) => Ok(self.finalize(&head, response, None, started)),
            Err(error) if self.catch_errors => {
                let (response, outcome) = self.recover(&error, &head);
                Ok(self.finalize(&head, response, outcome, started))
            }
            Err(error) => {
                metrics::record_request(
                    Outcome::Propagated,
                    error.status_code().as_u16(),
                    started.elapsed(),
                );
                Err(error)
            }
        }
    }

    async fn dispatch(&self, mut request: Request, head: &mut RequestHead) -> MeridianResult<Response> {
        let route = self
            .router
            .match_uri(request.method(), request.uri())?
            .ok_or_else(|| {
                MeridianError::route_not_found(request.method().as_str(), request.uri().path())
            })?;

        head.route = Some(route.clone());
        request.extensions_mut().insert(route);
        self.chain
            .run(request, Response::with_status(StatusCode::OK))
            .await
    }

    /// Runs the two error tiers. Returns `Some(Outcome::Fatal)` when the
    /// fatal path produced the response.
    fn recover(&self, error: &MeridianError, head: &RequestHead) -> (Response, Option<Outcome>) {
        match self.error_handler.handle(error, head) {
            Ok(response) => {
                if !error.is_client_error() {
                    warn!(error = %error, status = response.status().as_u16(), "Recovered from error");
                }
                (response, None)
            }
            Err(secondary) => {
                error!(
                    error = %error,
                    secondary = %secondary,
                    "Error handler failed, using fatal fallback"
                );
                metrics::record_fatal_error();
                (
                    self.error_handler.handle_fatal(&secondary, head),
                    Some(Outcome::Fatal),
                )
            }
        }
    }

    fn finalize(
        &self,
        head: &RequestHead,
        mut response: Response,
        outcome: Option<Outcome>,
        started: Instant,
    ) -> Response {
        if head.method == Method::HEAD {
            *response.body_mut() = Full::new(Bytes::new());
        }

        if response.status() == StatusCode::METHOD_NOT_ALLOWED
            && !response.headers().contains_key(ALLOW)
        {
            let allowed = self
                .router
                .allowed_methods(head.path())
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allowed) {
                response.headers_mut().insert(ALLOW, value);
            }
        }

        let status = response.status().as_u16();
        let outcome = outcome.unwrap_or_else(|| Outcome::from_status(status));
        metrics::record_request(outcome, status, started.elapsed());
        debug!(status, outcome = %outcome, "Request finished");

        response
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("router", &self.router)
            .field("chain", &self.chain)
            .field("catch_errors", &self.catch_errors)
            .finish_non_exhaustive()
    }
}
