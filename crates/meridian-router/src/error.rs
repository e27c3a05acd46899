//! Router error types.

use meridian_core::MeridianError;
use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The same placeholder name appears twice in one template.
    #[error("duplicate capture '{name}' in path template '{template}'")]
    DuplicateCapture {
        /// The normalized template.
        template: String,
        /// The repeated placeholder name.
        name: String,
    },

    /// The generated pattern was rejected by the regex engine.
    #[error("invalid pattern for path template '{template}'")]
    InvalidRegex {
        /// The normalized template.
        template: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while matching a request.
///
/// A path that matches nothing is not an error; see
/// [`Router::match_route`](crate::Router::match_route).
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A mask matched the path but none of the matching endpoints allow the verb.
    #[error("method {method} not allowed for {mask}")]
    MethodNotAllowed {
        /// The mask of the last endpoint whose path matched.
        mask: String,
        /// The rejected verb.
        method: String,
    },

    /// The query string could not be decoded.
    #[error("malformed query string")]
    MalformedQuery(#[from] serde_urlencoded::de::Error),
}

impl From<RoutingError> for MeridianError {
    fn from(error: RoutingError) -> Self {
        match error {
            RoutingError::MethodNotAllowed { mask, method } => {
                MeridianError::method_not_allowed(mask, method)
            }
            RoutingError::MalformedQuery(source) => {
                MeridianError::validation(format!("malformed query string: {source}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_converts_to_405() {
        let err: MeridianError = RoutingError::MethodNotAllowed {
            mask: "/items".to_string(),
            method: "GET".to_string(),
        }
        .into();
        assert_eq!(err.status_code().as_u16(), 405);
        assert!(err.to_string().contains("/items"));
    }

    #[test]
    fn test_duplicate_capture_message_names_both_parts() {
        let err = PatternError::DuplicateCapture {
            template: "/a/{id}/{id}".to_string(),
            name: "id".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/a/{id}/{id}"));
        assert!(message.contains("'id'"));
    }
}
