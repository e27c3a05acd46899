//! Error types for Meridian.
//!
//! This module provides the [`MeridianError`] type, which is the error type
//! carried through the request dispatch pipeline. Compilation-time problems
//! (broken route tables) live in `meridian-schema` and never reach this type.
//!
//! | Category | Default status |
//! |---|---|
//! | `Validation` | 400 |
//! | `Authentication` | 401 |
//! | `Authorization` | 403 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `Conflict` | 409 |
//! | `Client` | carried status (4xx) |
//! | `Internal` | 500 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::HandlerRef;

/// Result type alias using [`MeridianError`].
pub type MeridianResult<T> = Result<T, MeridianError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input).
    Validation,
    /// Authentication errors (invalid/missing credentials).
    Authentication,
    /// Authorization errors (permission denied).
    Authorization,
    /// No endpoint for the requested path.
    NotFound,
    /// The path matched but the verb did not.
    MethodNotAllowed,
    /// Conflict (e.g., concurrent modification).
    Conflict,
    /// Any other error that identified itself with a 4xx status.
    Client,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation | Self::Client => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error raised while dispatching a request.
///
/// Middleware, decorators and endpoint handlers all report failures through
/// this type. Client errors (4xx) carry enough context to be shown to the
/// caller; internal errors keep their source hidden unless debug mode is on.
///
/// # Example
///
/// ```
/// use meridian_core::{ErrorCategory, MeridianError};
///
/// let error = MeridianError::method_not_allowed("/items", "GET");
/// assert_eq!(error.category(), ErrorCategory::MethodNotAllowed);
/// assert_eq!(error.status_code().as_u16(), 405);
/// ```
#[derive(Error, Debug)]
pub enum MeridianError {
    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// No endpoint matched the request path.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// An endpoint matched the path but not the verb.
    #[error("Method {method} not allowed for {mask}")]
    MethodNotAllowed {
        /// The mask whose path matched.
        mask: String,
        /// The rejected HTTP verb.
        method: String,
    },

    /// Conflict error.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// An error that carries its own HTTP status.
    #[error("{message}")]
    Http {
        /// The status to respond with.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },

    /// The matched endpoint's handler could not be resolved.
    #[error("No handler registered for {handler}")]
    UnresolvedHandler {
        /// The handler that was looked up.
        handler: HandlerRef,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MeridianError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates the not found error for a request that matched no endpoint.
    #[must_use]
    pub fn route_not_found(method: &str, path: &str) -> Self {
        Self::not_found(format!("no endpoint for {method} {path}"))
    }

    /// Creates a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(mask: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            mask: mask.into(),
            method: method.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an error with an explicit HTTP status.
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Http { status, .. } if status.is_client_error() => ErrorCategory::Client,
            Self::Http { .. } | Self::UnresolvedHandler { .. } | Self::Internal { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } if status.is_client_error() || status.is_server_error() => {
                *status
            }
            _ => self.category().default_status_code(),
        }
    }

    /// Returns true when the error should be reported as a 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Server errors only expose their message (and source chain) when
    /// `debug` is set; client errors are always described.
    #[must_use]
    pub fn to_envelope(&self, debug: bool) -> ErrorEnvelope {
        let message = if debug || self.is_client_error() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                category: self.category(),
                details: self.error_details(debug),
            },
        }
    }

    /// Returns a machine-readable error code.
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Conflict { .. } => "CONFLICT",
            Self::Http { .. } if self.is_client_error() => "CLIENT_ERROR",
            Self::Http { .. } | Self::UnresolvedHandler { .. } | Self::Internal { .. } => {
                "INTERNAL_ERROR"
            }
        }
    }

    fn error_details(&self, debug: bool) -> Option<serde_json::Value> {
        match self {
            Self::MethodNotAllowed { mask, method } => Some(serde_json::json!({
                "mask": mask,
                "method": method
            })),
            Self::UnresolvedHandler { handler } if debug => Some(serde_json::json!({
                "handler": handler.to_string()
            })),
            Self::Internal {
                source: Some(source),
                ..
            } if debug => Some(serde_json::json!({ "source": format!("{source:#}") })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = MeridianError::validation("Invalid email format");
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("Invalid email format"));
    }

    #[test]
    fn test_method_not_allowed_carries_mask_and_verb() {
        let error = MeridianError::method_not_allowed("/items", "GET");
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(error.is_client_error());

        let envelope = error.to_envelope(false);
        let details = envelope.error.details.unwrap();
        assert_eq!(details["mask"], "/items");
        assert_eq!(details["method"], "GET");
    }

    #[test]
    fn test_http_error_self_identifies_status() {
        let error = MeridianError::http(StatusCode::UNPROCESSABLE_ENTITY, "bad payload");
        assert_eq!(error.category(), ErrorCategory::Client);
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let error = MeridianError::http(StatusCode::SERVICE_UNAVAILABLE, "draining");
        assert_eq!(error.category(), ErrorCategory::Internal);
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_http_error_with_success_status_is_internal() {
        let error = MeridianError::http(StatusCode::OK, "not an error status");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_hides_message_without_debug() {
        let error = MeridianError::internal_with_source(
            "database exploded",
            anyhow::anyhow!("connection reset"),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope = error.to_envelope(false);
        assert_eq!(envelope.error.message, "Internal server error");
        assert!(envelope.error.details.is_none());

        let envelope = error.to_envelope(true);
        assert!(envelope.error.message.contains("database exploded"));
        assert_eq!(envelope.error.details.unwrap()["source"], "connection reset");
    }

    #[test]
    fn test_authorization_envelope_has_message_only() {
        let error = MeridianError::authorization("orders are read-only");
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);

        let envelope = error.to_envelope(true);
        assert_eq!(envelope.error.code, "AUTHORIZATION_DENIED");
        assert!(envelope.error.message.contains("orders are read-only"));
        assert!(envelope.error.details.is_none());
    }

    #[test]
    fn test_unresolved_handler_is_internal() {
        let error = MeridianError::UnresolvedHandler {
            handler: HandlerRef::new("OrderController", "list"),
        };
        assert_eq!(error.category(), ErrorCategory::Internal);
        assert!(error.to_string().contains("OrderController::list"));
    }

    #[test]
    fn test_error_envelope_serialization() {
        let error = MeridianError::not_found("Resource not found");
        let envelope = error.to_envelope(false);

        let json = serde_json::to_string(&envelope).expect("serialization should work");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("\"category\":\"not_found\""));
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::Authentication,
            ErrorCategory::Authorization,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::Conflict,
            ErrorCategory::Client,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
