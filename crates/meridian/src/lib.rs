//! # Meridian
//!
//! **Declarative HTTP routing, schema compilation and middleware dispatch**
//!
//! Meridian turns endpoint declarations into a validated, cacheable route
//! schema and dispatches requests through a priority-ordered middleware
//! chain:
//!
//! - **Schema Compilation** – Declarations are validated, ordered and hydrated into a [`Schema`](router::Schema)
//! - **Pattern Routing** – Path templates compile to anchored patterns, with 405 detection
//! - **Middleware Chain** – Priority-ordered middlewares wrap a dispatcher stage
//! - **Decorators** – Request, response and error hooks around each handler call
//! - **Error Pipeline** – Errors become JSON envelopes, with a fatal fallback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use meridian::prelude::*;
//!
//! let mut declarations = SchemaBuilder::new();
//! declarations.add_controller(
//!     ControllerDeclaration::new("UserController", "users")
//!         .with_method(MethodDeclaration::new("show", "{id}", ["GET"])),
//! );
//!
//! let registry = HandlerRegistry::new().with(
//!     "UserController",
//!     "show",
//!     FnHandler::new(|_request, response| Box::pin(async move { Ok(response) })),
//! );
//!
//! let bootstrap = Bootstrap::from_env()?;
//! bootstrap.init_logging()?;
//!
//! let kernel = bootstrap
//!     .kernel(&declarations, &KnownTypes::new().with_controller("UserController"))?
//!     .resolver(registry)
//!     .build()?;
//!
//! let response = kernel.handle(request).await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! declarations → SchemaBuilder → (SchemaCache) → Schema → Router
//!                                                           ↓
//! Request → Kernel → route → m[0] → ... → m[n] → dispatcher → handler
//!                                                                ↓
//! Response ← finalize ← ErrorHandler (on Err) ←──────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/meridian/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bootstrap;

pub use bootstrap::{Bootstrap, BootstrapError};

// Re-export core types
pub use meridian_core as core;

// Re-export router types
pub use meridian_router as router;

// Re-export schema compilation
pub use meridian_schema as schema;

// Re-export dispatch types
pub use meridian_middleware as middleware;

// Re-export configuration
pub use meridian_config as config;

// Re-export logging and metrics
pub use meridian_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use meridian::prelude::*;
///
/// let config = MeridianConfig::default();
/// assert!(config.kernel.catch_errors);
/// ```
pub mod prelude {
    pub use crate::bootstrap::{Bootstrap, BootstrapError};

    pub use meridian_core::{HandlerRef, MeridianError, MeridianResult};

    pub use meridian_router::{RouteMatch, Router, Schema};

    // Re-export declaration builders
    pub use meridian_schema::{
        ControllerDeclaration, KnownTypes, MethodDeclaration, ParameterDeclaration,
        PermissiveTypes, SchemaBuilder, SchemaCache, TypeResolver,
    };

    // Re-export dispatch types
    pub use meridian_middleware::{
        Decorated, EndpointHandler, ErrorHandler, FnHandler, FnMiddleware, HandlerRegistry,
        Kernel, KernelBuilder, Middleware, Next, Request, Response, ResponseExt,
    };

    pub use meridian_config::{ConfigLoader, MeridianConfig};
}
