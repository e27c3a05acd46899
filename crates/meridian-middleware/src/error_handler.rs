//! Turning pipeline errors into responses.
//!
//! The kernel calls [`ErrorHandler::handle`] for any error that escapes the
//! chain. If that fails too, [`ErrorHandler::handle_fatal`] is called with the
//! new error and must produce a response no matter what.

use http::StatusCode;
use meridian_core::{MeridianError, MeridianResult};
use tracing::warn;

use crate::types::{RequestHead, Response, ResponseExt};

/// Converts errors into responses at the outermost boundary.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Renders `error` as a response.
    ///
    /// # Errors
    ///
    /// An error here sends the request down the fatal path.
    fn handle(&self, error: &MeridianError, request: &RequestHead) -> MeridianResult<Response>;

    /// Renders a minimal response after `handle` failed. Must not fail.
    fn handle_fatal(&self, error: &MeridianError, request: &RequestHead) -> Response;

    /// Enables or disables detailed error output.
    fn set_debug_mode(&mut self, debug: bool);

    /// Returns whether detailed error output is enabled.
    fn debug_mode(&self) -> bool;
}

/// Renders errors as the JSON error envelope.
///
/// ```json
/// {"error": {"code": "METHOD_NOT_ALLOWED", "message": "...", "category": "method_not_allowed"}}
/// ```
///
/// Server errors hide their message unless debug mode is on. The fatal path
/// answers with a plain-text 500.
#[derive(Debug, Clone, Default)]
pub struct DefaultErrorHandler {
    debug: bool,
}

impl DefaultErrorHandler {
    /// Creates a handler with debug mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, error: &MeridianError, request: &RequestHead) -> MeridianResult<Response> {
        let envelope = error.to_envelope(self.debug);
        let body = serde_json::to_vec(&envelope).map_err(|e| {
            MeridianError::internal_with_source("failed to serialize error envelope", e)
        })?;

        if error.is_client_error() {
            warn!(
                method = %request.method,
                path = %request.path(),
                status = error.status_code().as_u16(),
                error = %error,
                "Request failed"
            );
        }

        Ok(Response::json(error.status_code(), body))
    }

    fn handle_fatal(&self, error: &MeridianError, _request: &RequestHead) -> Response {
        let body = if self.debug {
            format!("Internal Server Error: {}", sanitize(&error.to_string()))
        } else {
            "Internal Server Error".to_string()
        };
        Response::text(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    fn set_debug_mode(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn debug_mode(&self) -> bool {
        self.debug
    }
}

/// Replaces control characters so the message is safe in a text body.
fn sanitize(message: &str) -> String {
    message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
