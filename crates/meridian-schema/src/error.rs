//! Schema compilation errors.
//!
//! Every variant is fatal: a schema error means the route table is broken
//! and the process should not start serving.

use std::path::PathBuf;

use meridian_core::HandlerRef;
use meridian_router::PatternError;
use thiserror::Error;

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building, validating, serializing or hydrating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A controller does not satisfy the controller contract.
    #[error("controller '{controller}' does not implement the controller contract")]
    ControllerContract {
        /// The controller type identity.
        controller: String,
    },

    /// The same placeholder appears twice in one fully qualified mask.
    #[error("duplicate capture '{name}' in mask '{mask}' of {handler}")]
    DuplicateCapture {
        /// The offending handler.
        handler: HandlerRef,
        /// The fully qualified mask.
        mask: String,
        /// The repeated placeholder.
        name: String,
    },

    /// A `{name}` in the mask has no path-located parameter declaration.
    #[error("path parameter '{name}' in mask '{mask}' of {handler} is not declared")]
    UndeclaredPathParameter {
        /// The offending handler.
        handler: HandlerRef,
        /// The fully qualified mask.
        mask: String,
        /// The placeholder name.
        name: String,
    },

    /// A path-located parameter declaration has no `{name}` in the mask.
    #[error("path parameter '{name}' of {handler} does not appear in mask '{mask}'")]
    OrphanedPathParameter {
        /// The offending handler.
        handler: HandlerRef,
        /// The fully qualified mask.
        mask: String,
        /// The declared parameter name.
        name: String,
    },

    /// Two handlers claim the same mask for the same verb.
    #[error("route {method} {mask} is declared by both {first} and {second}")]
    DuplicateRoute {
        /// The normalized mask.
        mask: String,
        /// The overlapping verb.
        method: String,
        /// The handler declared first.
        first: HandlerRef,
        /// The handler declared second.
        second: HandlerRef,
    },

    /// A parameter location outside the closed set.
    #[error("parameter '{parameter}' of {handler} has invalid location '{value}'")]
    InvalidParameterLocation {
        /// The offending handler.
        handler: HandlerRef,
        /// The parameter name.
        parameter: String,
        /// The rejected location.
        value: String,
    },

    /// A parameter type outside the closed set.
    #[error("parameter '{parameter}' of {handler} has invalid type '{value}'")]
    InvalidParameterType {
        /// The offending handler.
        handler: HandlerRef,
        /// The parameter name.
        parameter: String,
        /// The rejected type.
        value: String,
    },

    /// A request body references an entity that cannot be resolved.
    #[error("request body of {handler} references unknown entity '{entity}'")]
    UnknownEntity {
        /// The offending handler.
        handler: HandlerRef,
        /// The unresolved entity type.
        entity: String,
    },

    /// A verb list is empty or holds something that is not an HTTP method.
    #[error("invalid HTTP method '{value}' on {context}")]
    InvalidMethod {
        /// Where the verb was found (a handler or a record position).
        context: String,
        /// The rejected verb, empty when the list itself was empty.
        value: String,
    },

    /// A builder mutation named a controller that was never added.
    #[error("unknown controller '{controller}'")]
    UnknownController {
        /// The controller type identity.
        controller: String,
    },

    /// A builder mutation named a method the controller does not have.
    #[error("unknown method '{method}' on controller '{controller}'")]
    UnknownMethod {
        /// The controller type identity.
        controller: String,
        /// The method name.
        method: String,
    },

    /// A flat record lacks a required field.
    #[error("schema record {index} is missing required field '{field}'")]
    MissingField {
        /// Position of the record in the record array.
        index: usize,
        /// Dotted name of the missing field.
        field: &'static str,
    },

    /// A mask failed to compile.
    #[error("invalid pattern for mask '{mask}'")]
    InvalidPattern {
        /// The mask that failed.
        mask: String,
        /// Underlying compiler error.
        #[source]
        source: PatternError,
    },

    /// Several validation errors at once.
    #[error("schema validation failed with {} errors:\n{}", .0.len(), list(.0))]
    Invalid(Vec<SchemaError>),

    /// Record (de)serialization failed.
    #[error("schema serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The schema cache file could not be read or written.
    #[error("schema cache I/O error at {path}")]
    Io {
        /// The cache file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Collapses a list of errors: none is `Ok`, one is returned as is,
    /// several are wrapped in [`SchemaError::Invalid`].
    pub fn from_all(mut errors: Vec<Self>) -> SchemaResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Invalid(errors)),
        }
    }

    /// Returns the individual errors this error stands for.
    #[must_use]
    pub fn errors(&self) -> Vec<&Self> {
        match self {
            Self::Invalid(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn list(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
