//! # Meridian Schema
//!
//! Compiles endpoint declarations into a validated, serializable schema.
//!
//! ```text
//!  declarations ──► SchemaBuilder ──validate──► serialize ──► [EndpointRecord]
//!                                                                  │
//!                          Schema ◄──────── hydrate ◄──── (cache / transport)
//! ```
//!
//! - [`SchemaBuilder`] accumulates [`ControllerDeclaration`]s.
//! - [`validate`](SchemaBuilder::validate) runs the structural passes and
//!   reports every violation at once.
//! - [`serialize`] compiles final masks and orders records with the
//!   [hierarchy sorter](hierarchy).
//! - [`hydrate`] turns records back into a runtime [`Schema`].
//! - [`SchemaCache`] persists records and reuses them while the
//!   declarations are unchanged.

#![doc(html_root_url = "https://docs.rs/meridian-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod cache;
mod declaration;
mod error;
pub mod hierarchy;
mod record;
mod resolver;
mod validate;

pub use builder::SchemaBuilder;
pub use cache::{declarations_hash, schema_hash, CachedSchema, SchemaCache};
pub use declaration::{
    ControllerDeclaration, MethodDeclaration, ParameterDeclaration, RequestBodyDeclaration,
    ResponseDeclaration,
};
pub use error::{SchemaError, SchemaResult};
pub use record::{hydrate, hydrate_json, records_from_value, serialize, EndpointRecord};
pub use resolver::{KnownTypes, PermissiveTypes, TypeResolver};

pub use meridian_router::Schema;
