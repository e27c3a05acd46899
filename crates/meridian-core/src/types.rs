//! Declaration vocabulary shared by the schema compiler and the router.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies the code that serves an endpoint.
///
/// The pair is opaque to Meridian: an external resolver maps it to something
/// invocable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerRef {
    /// The controller type identity.
    pub class: String,
    /// The method name on the controller.
    pub method: String,
}

impl HandlerRef {
    /// Creates a new handler reference.
    #[must_use]
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// A string that did not name a member of one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} '{value}'")]
pub struct ParseVocabularyError {
    /// Which vocabulary was being parsed ("parameter location", ...).
    pub vocabulary: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// A `{name}` capture in the path.
    Path,
    /// The query string.
    Query,
    /// A request header.
    Header,
    /// A cookie.
    Cookie,
}

impl ParameterLocation {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(ParseVocabularyError {
                vocabulary: "parameter location",
                value: other.to_string(),
            }),
        }
    }
}

/// The declared value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Free-form text.
    String,
    /// Integer number.
    Int,
    /// Floating point number.
    Float,
    /// Boolean flag.
    Bool,
    /// Date or date-time.
    Date,
    /// One of a fixed set of values.
    Enum,
    /// Structured value, decoded by a denormalizer.
    Object,
}

impl ParameterType {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Enum => "enum",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "date" => Ok(Self::Date),
            "enum" => Ok(Self::Enum),
            "object" => Ok(Self::Object),
            other => Err(ParseVocabularyError {
                vocabulary: "parameter type",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_ref_display() {
        let handler = HandlerRef::new("OrderController", "show");
        assert_eq!(handler.to_string(), "OrderController::show");
    }

    #[test]
    fn test_location_parse() {
        assert_eq!("path".parse::<ParameterLocation>(), Ok(ParameterLocation::Path));
        assert_eq!("cookie".parse::<ParameterLocation>(), Ok(ParameterLocation::Cookie));

        let err = "body".parse::<ParameterLocation>().unwrap_err();
        assert_eq!(err.value, "body");
        assert!(err.to_string().contains("parameter location"));
    }

    #[test]
    fn test_type_parse_is_case_sensitive() {
        assert_eq!("int".parse::<ParameterType>(), Ok(ParameterType::Int));
        assert!("Int".parse::<ParameterType>().is_err());
        assert!("uuid".parse::<ParameterType>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ParameterType::Bool).unwrap();
        assert_eq!(json, "\"bool\"");
        let location: ParameterLocation = serde_json::from_str("\"header\"").unwrap();
        assert_eq!(location, ParameterLocation::Header);
    }
}
