//! Request, response and error decorators.
//!
//! Decorators run around endpoint invocation inside the dispatcher stage.
//! Each returns a [`Decorated`] value: `Continue` hands the (possibly
//! rewritten) value to the next decorator, `ShortCircuit` carries a finished
//! response and skips everything up to the end of dispatch.
//!
//! Closures with the matching signature implement the decorator traits:
//!
//! ```ignore
//! let mut decorators = DecoratorManager::new();
//! decorators.add_response_decorator(|_request: &Request, mut response: Response| -> MeridianResult<_> {
//!     response.headers_mut().insert("x-api-version", HeaderValue::from_static("2"));
//!     Ok(Decorated::Continue(response))
//! });
//! ```

use std::sync::Arc;

use meridian_core::{MeridianError, MeridianResult};

use crate::types::{Request, Response, ResponseExt};

/// Outcome of a decorator.
#[derive(Debug)]
pub enum Decorated<T> {
    /// Keep going with this value.
    Continue(T),
    /// Stop here and respond with this.
    ShortCircuit(Response),
}

/// Runs before the endpoint handler.
pub trait RequestDecorator: Send + Sync + 'static {
    /// Inspects or rewrites the request.
    fn decorate(&self, request: Request) -> MeridianResult<Decorated<Request>>;
}

/// Runs after the endpoint handler succeeds.
pub trait ResponseDecorator: Send + Sync + 'static {
    /// Inspects or rewrites the response.
    fn decorate(&self, request: &Request, response: Response)
        -> MeridianResult<Decorated<Response>>;
}

/// Runs after the endpoint handler fails.
pub trait ErrorDecorator: Send + Sync + 'static {
    /// Produces a recovery response for `error`.
    ///
    /// `response` starts out empty with the error's status code.
    fn decorate(
        &self,
        request: &Request,
        response: Response,
        error: &MeridianError,
    ) -> MeridianResult<Decorated<Response>>;
}

impl<F> RequestDecorator for F
where
    F: Fn(Request) -> MeridianResult<Decorated<Request>> + Send + Sync + 'static,
{
    fn decorate(&self, request: Request) -> MeridianResult<Decorated<Request>> {
        self(request)
    }
}

impl<F> ResponseDecorator for F
where
    F: Fn(&Request, Response) -> MeridianResult<Decorated<Response>> + Send + Sync + 'static,
{
    fn decorate(
        &self,
        request: &Request,
        response: Response,
    ) -> MeridianResult<Decorated<Response>> {
        self(request, response)
    }
}

impl<F> ErrorDecorator for F
where
    F: Fn(&Request, Response, &MeridianError) -> MeridianResult<Decorated<Response>>
        + Send
        + Sync
        + 'static,
{
    fn decorate(
        &self,
        request: &Request,
        response: Response,
        error: &MeridianError,
    ) -> MeridianResult<Decorated<Response>> {
        self(request, response, error)
    }
}

/// Ordered registries of the three decorator kinds.
///
/// Filled during setup, then shared read-only by the dispatcher.
#[derive(Default, Clone)]
pub struct DecoratorManager {
    request: Vec<Arc<dyn RequestDecorator>>,
    response: Vec<Arc<dyn ResponseDecorator>>,
    error: Vec<Arc<dyn ErrorDecorator>>,
}

impl DecoratorManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request decorator.
    pub fn add_request_decorator<D: RequestDecorator>(&mut self, decorator: D) -> &mut Self {
        self.request.push(Arc::new(decorator));
        self
    }

    /// Appends a response decorator.
    pub fn add_response_decorator<D: ResponseDecorator>(&mut self, decorator: D) -> &mut Self {
        self.response.push(Arc::new(decorator));
        self
    }

    /// Appends an error decorator.
    pub fn add_error_decorator<D: ErrorDecorator>(&mut self, decorator: D) -> &mut Self {
        self.error.push(Arc::new(decorator));
        self
    }

    /// Returns true if at least one error decorator is registered.
    #[must_use]
    pub fn has_error_decorators(&self) -> bool {
        !self.error.is_empty()
    }

    /// Runs the request decorators in order.
    pub fn decorate_request(&self, mut request: Request) -> MeridianResult<Decorated<Request>> {
        for decorator in &self.request {
            match decorator.decorate(request)? {
                Decorated::Continue(next) => request = next,
                short @ Decorated::ShortCircuit(_) => return Ok(short),
            }
        }
        Ok(Decorated::Continue(request))
    }

    /// Runs the response decorators in order.
    ///
    /// A short-circuit ends the run with the carried response.
    pub fn decorate_response(
        &self,
        request: &Request,
        mut response: Response,
    ) -> MeridianResult<Response> {
        for decorator in &self.response {
            match decorator.decorate(request, response)? {
                Decorated::Continue(next) => response = next,
                Decorated::ShortCircuit(done) => return Ok(done),
            }
        }
        Ok(response)
    }

    /// Runs the error decorators in order.
    ///
    /// Returns `None` when no error decorator is registered, so the caller
    /// propagates the original error instead of answering with an empty
    /// response.
    pub fn decorate_error(
        &self,
        request: &Request,
        error: &MeridianError,
    ) -> Option<MeridianResult<Response>> {
        if self.error.is_empty() {
            return None;
        }

        let mut response = Response::with_status(error.status_code());
        for decorator in &self.error {
            match decorator.decorate(request, response, error) {
                Ok(Decorated::Continue(next)) => response = next,
                Ok(Decorated::ShortCircuit(done)) => return Some(Ok(done)),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(response))
    }
}

impl std::fmt::Debug for DecoratorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratorManager")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("error", &self.error.len())
            .finish()
    }
}
