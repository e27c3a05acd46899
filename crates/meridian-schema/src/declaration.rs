//! Endpoint declarations.
//!
//! Declarations are the primitive, pre-validation shapes an external reader
//! hands to the [`SchemaBuilder`](crate::SchemaBuilder). Verbs, parameter
//! types and locations stay plain strings here; they are checked by the
//! validator and parsed by the serializer.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use meridian_core::{join_paths, HandlerRef};
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// A controller and the methods it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerDeclaration {
    /// The controller type identity.
    pub class: String,
    /// Base path prepended to every method path.
    #[serde(default)]
    pub path: String,
    /// Prefix for the ids of this controller's endpoints.
    #[serde(default)]
    pub id_prefix: String,
    /// Tags inherited by every method.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Methods keyed by name.
    #[serde(default)]
    pub methods: IndexMap<String, MethodDeclaration>,
}

impl ControllerDeclaration {
    /// Creates a controller with a base path and no methods.
    #[must_use]
    pub fn new(class: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            path: path.into(),
            id_prefix: String::new(),
            tags: BTreeMap::new(),
            methods: IndexMap::new(),
        }
    }

    /// Sets the id prefix.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Adds a method.
    pub fn with_method(mut self, method: MethodDeclaration) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    /// Returns the handler reference for one of this controller's methods.
    #[must_use]
    pub fn handler(&self, method: &MethodDeclaration) -> HandlerRef {
        HandlerRef::new(self.class.clone(), method.name.clone())
    }

    /// Returns the normalized mask of one of this controller's methods.
    #[must_use]
    pub fn mask(&self, method: &MethodDeclaration) -> String {
        join_paths(&self.path, &method.path)
    }

    /// Returns the endpoint id of one of this controller's methods.
    #[must_use]
    pub fn endpoint_id(&self, method: &MethodDeclaration) -> String {
        let suffix = method.id_suffix.as_deref().unwrap_or(&method.name);
        format!("{}{}", self.id_prefix, suffix)
    }

    /// Merges controller and method tags; the method wins on equal names.
    #[must_use]
    pub fn merged_tags(&self, method: &MethodDeclaration) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.extend(method.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        tags
    }
}

/// One method of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDeclaration {
    /// Method name.
    pub name: String,
    /// Path relative to the controller path.
    #[serde(default)]
    pub path: String,
    /// Id suffix; defaults to the method name.
    #[serde(default)]
    pub id_suffix: Option<String>,
    /// HTTP verbs, as declared.
    pub verbs: Vec<String>,
    /// Method tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Accepted request body.
    #[serde(default)]
    pub request_body: Option<RequestBodyDeclaration>,
    /// Parameters keyed by name.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterDeclaration>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<u16, ResponseDeclaration>,
}

impl MethodDeclaration {
    /// Creates a method with the given path and verbs.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, path: impl Into<String>, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            path: path.into(),
            id_suffix: None,
            verbs: verbs.into_iter().map(Into::into).collect(),
            tags: BTreeMap::new(),
            request_body: None,
            parameters: IndexMap::new(),
            responses: BTreeMap::new(),
        }
    }

    /// Sets the id suffix.
    pub fn with_id_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.id_suffix = Some(suffix.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, parameter: ParameterDeclaration) -> Self {
        self.parameters.insert(parameter.name.clone(), parameter);
        self
    }

    /// Adds a response.
    pub fn with_response(mut self, status: u16, response: ResponseDeclaration) -> Self {
        self.responses.insert(status, response);
        self
    }

    /// Sets the request body.
    pub fn with_request_body(mut self, body: RequestBodyDeclaration) -> Self {
        self.request_body = Some(body);
        self
    }
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDeclaration {
    /// Parameter name.
    pub name: String,
    /// Declared type (`string`, `int`, `float`, `bool`, `date`, `enum`, `object`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Declared location (`path`, `query`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
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
    #[serde(default)]
    pub description: Option<String>,
    /// Denormalizer reference, carried through untouched.
    #[serde(default)]
    pub denormalizer: Option<String>,
}

impl ParameterDeclaration {
    /// Creates a required parameter.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            location: location.into(),
            required: true,
            allow_empty: false,
            deprecated: false,
            description: None,
            denormalizer: None,
        }
    }

    /// Shorthand for a required `path` parameter.
    #[must_use]
    pub fn path(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(name, kind, "path")
    }

    /// Shorthand for a required `query` parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(name, kind, "query")
    }

    /// Marks the parameter optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Accepts empty values.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Marks the parameter deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the denormalizer reference.
    pub fn with_denormalizer(mut self, denormalizer: impl Into<String>) -> Self {
        self.denormalizer = Some(denormalizer.into());
        self
    }
}

/// A declared request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBodyDeclaration {
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

impl Default for RequestBodyDeclaration {
    fn default() -> Self {
        Self {
            description: String::new(),
            entity: None,
            required: true,
        }
    }
}

impl RequestBodyDeclaration {
    /// Creates a required body of the given entity type.
    #[must_use]
    pub fn entity(entity: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            ..Self::default()
        }
    }

    /// Creates a required untyped body.
    #[must_use]
    pub fn untyped() -> Self {
        Self::default()
    }
}

/// A declared response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseDeclaration {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Referenced entity type.
    #[serde(default)]
    pub entity: Option<String>,
}

impl ResponseDeclaration {
    /// Creates a response with a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            entity: None,
        }
    }

    /// Sets the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_and_id() {
        let controller = ControllerDeclaration::new("OrderController", "orders")
            .with_id_prefix("orders.");
        let method = MethodDeclaration::new("items", "{orderId}/items", ["GET"]);

        assert_eq!(controller.mask(&method), "/orders/{orderId}/items");
        assert_eq!(controller.endpoint_id(&method), "orders.items");
        assert_eq!(
            controller.endpoint_id(&method.clone().with_id_suffix("listItems")),
            "orders.listItems"
        );
        assert_eq!(controller.handler(&method).to_string(), "OrderController::items");
    }

    #[test]
    fn test_method_tags_override_controller_tags() {
        let controller = ControllerDeclaration::new("C", "/")
            .with_tag("auth", "user")
            .with_tag("group", "orders");
        let method = MethodDeclaration::new("m", "/", ["GET"]).with_tag("auth", "admin");

        let tags = controller.merged_tags(&method);
        assert_eq!(tags.get("auth").map(String::as_str), Some("admin"));
        assert_eq!(tags.get("group").map(String::as_str), Some("orders"));
    }

    #[test]
    fn test_declarations_deserialize_with_defaults() {
        let controller: ControllerDeclaration = serde_json::from_str(
            r#"{
                "class": "UserController",
                "path": "users",
                "methods": {
                    "show": {
                        "name": "show",
                        "path": "{id}",
                        "verbs": ["GET"],
                        "parameters": {
                            "id": {"name": "id", "type": "int", "in": "path"}
                        },
                        "requestBody": {"entity": "User"}
                    }
                }
            }"#,
        )
        .unwrap();

        let method = &controller.methods["show"];
        assert!(method.parameters["id"].required);
        assert_eq!(
            method.request_body.as_ref(),
            Some(&RequestBodyDeclaration::entity("User"))
        );
        let body = method.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.entity.as_deref(), Some("User"));
    }

    #[test]
    fn test_builder_defaults_match_serde_defaults() {
        let body: RequestBodyDeclaration = serde_json::from_str("{}").unwrap();
        assert_eq!(body, RequestBodyDeclaration::default());
        assert!(RequestBodyDeclaration::untyped().required);
        assert!(RequestBodyDeclaration::untyped().entity.is_none());

        let page = ParameterDeclaration::query("page", "int");
        assert!(page.required);
        assert!(!page.clone().optional().required);
    }
}
