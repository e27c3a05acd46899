//! # Meridian Middleware
//!
//! Request dispatch for Meridian: the middleware chain, decorators around
//! endpoint invocation, and the error pipeline.
//!
//! ```text
//! Request → Kernel::handle → route → m[0] → m[1] → ... → dispatcher
//!                                                           │
//!                              request decorators → handler → response decorators
//!                                                     │ Err
//!                                                     └─→ error decorators
//! Response ← finalize ← ErrorHandler (on Err) ←───────────────┘
//! ```
//!
//! | Piece | Role |
//! |-------|------|
//! | [`MiddlewareChain`] | Priority-ordered middlewares around a passthrough terminal |
//! | [`DecoratorManager`] | Request, response and error decorators |
//! | [`ErrorHandler`] | `handle` then `handle_fatal` at the outer boundary |
//! | [`HandlerResolver`] | Maps a [`HandlerRef`](meridian_core::HandlerRef) to an [`EndpointHandler`] |
//! | [`Kernel`] | Ties routing, the chain and error handling together |
//!
//! ## Example
//!
//! ```ignore
//! use meridian_middleware::{FnHandler, HandlerRegistry, Kernel};
//!
//! let registry = HandlerRegistry::new().with(
//!     "HealthController",
//!     "check",
//!     FnHandler::new(|_request, response| Box::pin(async move { Ok(response) })),
//! );
//!
//! let kernel = Kernel::builder()
//!     .router(router)
//!     .resolver(registry)
//!     .build()?;
//!
//! let response = kernel.handle(request).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/meridian-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod decorator;
pub mod error_handler;
pub mod handler;
pub mod kernel;
pub mod middleware;
pub mod types;

pub use chain::{BoxedMiddleware, ChainBuilder, ChainError, MiddlewareChain, DEFAULT_PRIORITY};
pub use decorator::{
    Decorated, DecoratorManager, ErrorDecorator, RequestDecorator, ResponseDecorator,
};
pub use error_handler::{DefaultErrorHandler, ErrorHandler};
pub use handler::{EndpointHandler, FnHandler, HandlerRegistry, HandlerResolver};
pub use kernel::{Kernel, KernelBuilder, KernelError, DISPATCHER_PRIORITY};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use types::{Request, RequestHead, Response, ResponseExt};
