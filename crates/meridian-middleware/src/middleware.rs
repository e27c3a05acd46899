//! Core middleware trait and types.
//!
//! A middleware receives the request, the response built so far, and a
//! [`Next`] handle for the rest of the chain. The last link of every chain is
//! a passthrough that hands the response back unchanged.
//!
//! # Example
//!
//! ```ignore
//! use meridian_middleware::{BoxFuture, Middleware, Next, Request, Response};
//! use meridian_core::MeridianResult;
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         request: Request,
//!         response: Response,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MeridianResult<Response>> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let response = next.run(request, response).await;
//!             tracing::debug!(elapsed = ?started.elapsed(), "request timed");
//!             response
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use meridian_core::MeridianResult;

use crate::types::{Request, Response};

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core middleware trait.
///
/// # Invariants
///
/// - Call `next.run()` at most once. Not calling it short-circuits the rest
///   of the chain, including endpoint dispatch.
/// - Errors from downstream should be returned, not swallowed; the kernel's
///   error handler turns them into responses.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request and returns the response.
    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, MeridianResult<Response>>;
}

/// Handle to the rest of the chain.
///
/// Consumed by [`run`](Next::run), so it can be invoked only once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Passthrough,
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given middleware.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal link, which returns the response unchanged.
    pub(crate) const fn passthrough() -> Self {
        Self {
            inner: NextInner::Passthrough,
        }
    }

    /// Invokes the rest of the chain.
    pub async fn run(self, request: Request, response: Response) -> MeridianResult<Response> {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(request, response, *next).await
            }
            NextInner::Passthrough => Ok(response),
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```ignore
/// let tagging = FnMiddleware::new("tagging", |request, mut response, next| {
///     Box::pin(async move {
///         response.headers_mut().insert("x-served-by", HeaderValue::from_static("meridian"));
///         next.run(request, response).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Response, Next<'a>) -> BoxFuture<'a, MeridianResult<Response>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Response, Next<'a>) -> BoxFuture<'a, MeridianResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, MeridianResult<Response>> {
        (self.func)(request, response, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::header::HeaderValue;
    use http::StatusCode;
    use http_body_util::Full;

    struct StampMiddleware {
        name: &'static str,
    }

    impl Middleware for StampMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            request: Request,
            mut response: Response,
            next: Next<'a>,
        ) -> BoxFuture<'a, MeridianResult<Response>> {
            Box::pin(async move {
                response
                    .headers_mut()
                    .append("x-stamp", HeaderValue::from_static(self.name));
                next.run(request, response).await
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passthrough_returns_response_unchanged() {
        let response = Response::with_status(StatusCode::ACCEPTED);
        let response = Next::passthrough().run(request(), response).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let first = StampMiddleware { name: "first" };
        let second = StampMiddleware { name: "second" };

        let next = Next::new(&first, Next::new(&second, Next::passthrough()));
        let response = next
            .run(request(), Response::with_status(StatusCode::OK))
            .await
            .unwrap();

        let stamps: Vec<_> = response.headers().get_all("x-stamp").iter().collect();
        assert_eq!(stamps, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_fn_middleware_can_short_circuit() {
        let gate = FnMiddleware::new("gate", |_request, _response, _next| {
            Box::pin(async { Ok(Response::with_status(StatusCode::FORBIDDEN)) })
        });
        let after = StampMiddleware { name: "after" };
        assert_eq!(gate.name(), "gate");

        let next = Next::new(&gate, Next::new(&after, Next::passthrough()));
        let response = next
            .run(request(), Response::with_status(StatusCode::OK))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get("x-stamp").is_none());
    }
}
