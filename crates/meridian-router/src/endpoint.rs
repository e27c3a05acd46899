//! Runtime endpoints and the schema the router matches against.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use meridian_core::{HandlerRef, ParameterLocation, ParameterType};
use serde::{Deserialize, Serialize};

use crate::pattern::PathPattern;

const fn default_true() -> bool {
    true
}

/// A declared request parameter.
///
/// The serialized form uses `type`/`in` keys; omitted optional fields take
/// the defaults `required = true`, `allowEmpty = false`,
/// `deprecated = false`, `denormalizer = null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Where the parameter is read from.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be present.
    #[serde(default = "default_true")]
    pub required: bool,
    /// Whether an empty value is accepted.
    #[serde(default)]
    pub allow_empty: bool,
    /// Whether the parameter is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to the component that turns the raw value into a typed one.
    #[serde(default)]
    pub denormalizer: Option<String>,
}

impl ParameterSpec {
    /// Creates a required parameter with default flags.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterType, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
            required: true,
            allow_empty: false,
            deprecated: false,
            description: None,
            denormalizer: None,
        }
    }
}

/// The request body an endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestBodySpec {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Referenced entity type; `None` means an untyped body.
    #[serde(default)]
    pub entity: Option<String>,
    /// Whether a body must be sent.
    #[serde(default = "default_true")]
    pub required: bool,
}

/// A documented response for one status code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Referenced entity type.
    #[serde(default)]
    pub entity: Option<String>,
}

/// One invocable route: handler, verbs, mask and metadata.
///
/// Endpoints are immutable once placed in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint identifier (controller id prefix + method id suffix).
    pub id: String,
    /// The handler that serves this endpoint.
    pub handler: HandlerRef,
    /// Allowed HTTP verbs.
    pub methods: Vec<Method>,
    /// Compiled mask.
    pub pattern: PathPattern,
    /// Declared parameters keyed by name.
    pub parameters: IndexMap<String, ParameterSpec>,
    /// Accepted request body.
    pub request_body: Option<RequestBodySpec>,
    /// Documented responses keyed by status code.
    pub responses: BTreeMap<u16, ResponseSpec>,
    /// Free-form tags (authorization requirements, grouping, ...).
    pub tags: BTreeMap<String, String>,
}

impl Endpoint {
    /// Creates an endpoint with no metadata.
    #[must_use]
    pub fn new(handler: HandlerRef, methods: Vec<Method>, pattern: PathPattern) -> Self {
        Self {
            id: handler.method.clone(),
            handler,
            methods,
            pattern,
            parameters: IndexMap::new(),
            request_body: None,
            responses: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Returns the normalized mask.
    #[must_use]
    pub fn mask(&self) -> &str {
        self.pattern.mask()
    }

    /// Returns true if the verb is allowed.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Returns the sorted, comma-joined verb list (`"GET, POST"`).
    #[must_use]
    pub fn verb_key(&self) -> String {
        verb_key(&self.methods)
    }

    /// Returns the parameters read from the path.
    pub fn path_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters
            .values()
            .filter(|p| p.location == ParameterLocation::Path)
    }
}

/// Builds the sorted, comma-joined key for a verb list.
#[must_use]
pub fn verb_key(methods: &[Method]) -> String {
    let mut verbs: Vec<&str> = methods.iter().map(Method::as_str).collect();
    verbs.sort_unstable();
    verbs.dedup();
    verbs.join(", ")
}

/// The ordered collection of endpoints a router matches against.
///
/// A schema is built once and never mutated; endpoints are shared by
/// reference-counted pointers so route matches can carry them cheaply.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    endpoints: Vec<Arc<Endpoint>>,
}

impl Schema {
    /// Creates a schema from endpoints in matching order.
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(Arc::new).collect(),
        }
    }

    /// Returns the number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if the schema has no endpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Returns the endpoint at a position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(index)
    }

    /// Iterates endpoints in matching order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.iter()
    }

    /// Finds an endpoint by id.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.iter().find(|e| e.id == id)
    }
}

impl FromIterator<Endpoint> for Schema {
    fn from_iter<I: IntoIterator<Item = Endpoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(methods: Vec<Method>, mask: &str) -> Endpoint {
        Endpoint::new(
            HandlerRef::new("ItemController", "handle"),
            methods,
            PathPattern::compile(mask).unwrap(),
        )
    }

    #[test]
    fn test_verb_key_is_sorted() {
        assert_eq!(verb_key(&[Method::POST, Method::GET]), "GET, POST");
        assert_eq!(verb_key(&[Method::GET]), "GET");
        assert!("GET" < "GET, POST" && "GET, POST" < "POST");
    }

    #[test]
    fn test_endpoint_allows() {
        let e = endpoint(vec![Method::GET, Method::HEAD], "/items");
        assert!(e.allows(&Method::GET));
        assert!(!e.allows(&Method::POST));
        assert_eq!(e.mask(), "/items");
    }

    #[test]
    fn test_parameter_spec_defaults_on_deserialize() {
        let spec: ParameterSpec =
            serde_json::from_str(r#"{"name":"id","type":"int","in":"path"}"#).unwrap();
        assert!(spec.required);
        assert!(!spec.allow_empty);
        assert!(!spec.deprecated);
        assert!(spec.denormalizer.is_none());
        assert_eq!(spec, ParameterSpec::new("id", ParameterType::Int, ParameterLocation::Path));
    }

    #[test]
    fn test_schema_lookup() {
        let mut a = endpoint(vec![Method::GET], "/a");
        a.id = "items.list".to_string();
        let schema: Schema = vec![a, endpoint(vec![Method::POST], "/b")]
            .into_iter()
            .collect();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.find_by_id("items.list").unwrap().mask(), "/a");
        assert!(schema.find_by_id("missing").is_none());
    }
}
