//! Priority-ordered middleware chain.
//!
//! Middlewares are collected into a [`ChainBuilder`] and frozen into a
//! [`MiddlewareChain`]. Lower priorities run first; equal priorities keep
//! registration order. The first middleware in the frozen order wraps every
//! middleware after it.
//!
//! ```text
//! run(request) ──► m[0] ──► m[1] ──► ... ──► m[n-1] ──► passthrough
//!                   │                                       │
//! response ◄────────┴──────────────◄────────────────────────┘
//! ```

use std::sync::Arc;

use meridian_core::MeridianResult;
use thiserror::Error;
use tracing::debug;

use crate::middleware::{Middleware, Next};
use crate::types::{Request, Response};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Priority used when none is given.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Errors raised while freezing a chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The builder holds no middleware.
    #[error("cannot build a middleware chain with no middleware")]
    Empty,
}

/// Builder for a [`MiddlewareChain`].
///
/// # Example
///
/// ```ignore
/// let chain = MiddlewareChain::builder()
///     .add_with_priority(Audit, 20)
///     .add_with_priority(Auth, 5)
///     .add(Timing)
///     .build()?;
///
/// assert_eq!(chain.names(), vec!["timing", "auth", "audit"]);
/// ```
#[derive(Default)]
pub struct ChainBuilder {
    entries: Vec<(i32, BoxedMiddleware)>,
}

impl ChainBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a middleware at the default priority.
    #[must_use]
    pub fn add<M: Middleware>(self, middleware: M) -> Self {
        self.add_with_priority(middleware, DEFAULT_PRIORITY)
    }

    /// Adds a middleware at the given priority.
    #[must_use]
    pub fn add_with_priority<M: Middleware>(self, middleware: M, priority: i32) -> Self {
        self.add_boxed(Arc::new(middleware), priority)
    }

    /// Adds an already shared middleware at the given priority.
    #[must_use]
    pub fn add_boxed(mut self, middleware: BoxedMiddleware, priority: i32) -> Self {
        self.entries.push((priority, middleware));
        self
    }

    /// Returns the number of registered middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Empty`] if no middleware was added.
    pub fn build(mut self) -> Result<MiddlewareChain, ChainError> {
        if self.entries.is_empty() {
            return Err(ChainError::Empty);
        }

        // sort_by_key is stable: ties keep registration order
        self.entries.sort_by_key(|(priority, _)| *priority);
        let stages: Vec<_> = self.entries.into_iter().map(|(_, m)| m).collect();

        debug!(
            stages = ?stages.iter().map(|m| m.name()).collect::<Vec<_>>(),
            "Middleware chain built"
        );
        Ok(MiddlewareChain { stages })
    }
}

/// A frozen, shareable middleware chain.
pub struct MiddlewareChain {
    stages: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// Creates a new chain builder.
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Runs the request through every stage.
    pub async fn run(&self, request: Request, response: Response) -> MeridianResult<Response> {
        self.build_next().run(request, response).await
    }

    /// Folds the stages, last to first, around the passthrough terminal.
    fn build_next(&self) -> Next<'_> {
        self.stages
            .iter()
            .rev()
            .fold(Next::passthrough(), |next, middleware| {
                Next::new(middleware.as_ref(), next)
            })
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; a frozen chain has at least one stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::BoxFuture;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            request: Request,
            response: Response,
            next: Next<'a>,
        ) -> BoxFuture<'a, MeridianResult<Response>> {
            Box::pin(async move {
                self.order.lock().unwrap().push(self.name);
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

    #[test]
    fn test_empty_chain_is_rejected() {
        let err = ChainBuilder::new().build().unwrap_err();
        assert_eq!(err, ChainError::Empty);
    }

    #[tokio::test]
    async fn test_priorities_run_ascending() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let recorder = |name| Recorder {
            name,
            order: order.clone(),
        };

        let chain = MiddlewareChain::builder()
            .add_with_priority(recorder("twenty"), 20)
            .add_with_priority(recorder("five"), 5)
            .add_with_priority(recorder("ten"), 10)
            .build()
            .unwrap();

        assert_eq!(chain.names(), vec!["five", "ten", "twenty"]);
        chain
            .run(request(), Response::with_status(StatusCode::OK))
            .await
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["five", "ten", "twenty"]);
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let recorder = |name| Recorder {
            name,
            order: order.clone(),
        };

        let chain = MiddlewareChain::builder()
            .add(recorder("a"))
            .add_with_priority(recorder("late"), 1)
            .add(recorder("b"))
            .add_with_priority(recorder("early"), -1)
            .add(recorder("c"))
            .build()
            .unwrap();

        chain
            .run(request(), Response::with_status(StatusCode::OK))
            .await
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["early", "a", "b", "c", "late"]);
        assert_eq!(chain.len(), 5);
    }

    #[tokio::test]
    async fn test_chain_is_reusable() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::builder()
            .add(Recorder {
                name: "only",
                order: order.clone(),
            })
            .build()
            .unwrap();

        for _ in 0..3 {
            let response = chain
                .run(request(), Response::with_status(StatusCode::NO_CONTENT))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        assert_eq!(order.lock().unwrap().len(), 3);
    }
}
