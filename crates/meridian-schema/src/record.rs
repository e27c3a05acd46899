//! Flat schema records.
//!
//! The serializer turns the builder's declaration graph into an ordered
//! array of [`EndpointRecord`]s; the hydrator turns such an array back into
//! a runtime [`Schema`]. Records are plain data: they can be cached to disk
//! or shipped to another process as JSON.
//!
//! The serializer is the only place that compiles final masks and runs the
//! hierarchy sorter. The hydrator performs no validation; it only refuses
//! records that lack a required field.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use meridian_core::{HandlerRef, ParameterLocation, ParameterType};
use meridian_router::{
    Endpoint, ParameterSpec, PathPattern, RequestBodySpec, ResponseSpec, Schema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::builder::SchemaBuilder;
use crate::declaration::{ControllerDeclaration, MethodDeclaration, ParameterDeclaration};
use crate::error::{SchemaError, SchemaResult};
use crate::hierarchy::sort_hierarchy;
use crate::validate::parse_verb;

/// Required record fields, as JSON pointers and dotted names.
const REQUIRED_FIELDS: [(&str, &str); 4] = [
    ("/handler/class", "handler.class"),
    ("/handler/method", "handler.method"),
    ("/methods", "methods"),
    ("/mask", "mask"),
];

/// One endpoint in flat form.
///
/// ```json
/// {
///   "id": "orders.items",
///   "handler": {"class": "OrderController", "method": "items"},
///   "methods": ["GET"],
///   "mask": "/orders/{orderId}/items",
///   "pattern": "^/orders/(?P<orderId>[^/]+)/items$",
///   "parameters": [{"name": "orderId", "type": "int", "in": "path", ...}],
///   "responses": {"200": {"description": "Items", "entity": "Item"}},
///   "tags": {"auth": "user"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// Endpoint id; the handler method name when empty.
    #[serde(default)]
    pub id: String,
    /// Handler class and method.
    pub handler: HandlerRef,
    /// Upper-case verbs, sorted.
    pub methods: Vec<String>,
    /// Normalized mask.
    pub mask: String,
    /// Compiled pattern source; recompiled from the mask when empty.
    #[serde(default)]
    pub pattern: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// Accepted request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<u16, ResponseSpec>,
    /// Merged controller and method tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl EndpointRecord {
    /// Returns the sorted, comma-joined verb list.
    #[must_use]
    pub fn verb_key(&self) -> String {
        let mut verbs: Vec<&str> = self.methods.iter().map(String::as_str).collect();
        verbs.sort_unstable();
        verbs.dedup();
        verbs.join(", ")
    }
}

impl From<&Endpoint> for EndpointRecord {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id.clone(),
            handler: endpoint.handler.clone(),
            methods: endpoint.methods.iter().map(|m| m.as_str().to_string()).collect(),
            mask: endpoint.mask().to_string(),
            pattern: endpoint.pattern.as_str().to_string(),
            parameters: endpoint.parameters.values().cloned().collect(),
            request_body: endpoint.request_body.clone(),
            responses: endpoint.responses.clone(),
            tags: endpoint.tags.clone(),
        }
    }
}

/// Serializes the builder's declarations into hierarchy-ordered records.
///
/// No validation is performed here; call
/// [`SchemaBuilder::validate`] first, or use [`SchemaBuilder::compile`].
///
/// # Errors
///
/// Returns the first declaration that cannot be expressed as a record: a
/// mask that fails to compile, an unparsable verb, type or location.
pub fn serialize(builder: &SchemaBuilder) -> SchemaResult<Vec<EndpointRecord>> {
    let mut records = Vec::with_capacity(builder.method_count());
    for controller in builder.controllers() {
        for method in controller.methods.values() {
            records.push(record_for(controller, method)?);
        }
    }

    let records = sort_hierarchy(records, |r| r.mask.as_str(), EndpointRecord::verb_key);
    info!(endpoints = records.len(), "Schema serialized");
    Ok(records)
}

fn record_for(
    controller: &ControllerDeclaration,
    method: &MethodDeclaration,
) -> SchemaResult<EndpointRecord> {
    let handler = controller.handler(method);
    let mask = controller.mask(method);
    let pattern = PathPattern::compile(&mask).map_err(|source| SchemaError::InvalidPattern {
        mask: mask.clone(),
        source,
    })?;

    let mut methods = Vec::with_capacity(method.verbs.len());
    for verb in &method.verbs {
        let parsed = parse_verb(verb).ok_or_else(|| SchemaError::InvalidMethod {
            context: handler.to_string(),
            value: verb.clone(),
        })?;
        methods.push(parsed.as_str().to_string());
    }
    methods.sort_unstable();
    methods.dedup();

    let parameters = method
        .parameters
        .values()
        .map(|p| parameter_spec(&handler, p))
        .collect::<SchemaResult<Vec<_>>>()?;

    let request_body = method.request_body.as_ref().map(|body| RequestBodySpec {
        description: body.description.clone(),
        entity: body.entity.clone(),
        required: body.required,
    });

    let responses = method
        .responses
        .iter()
        .map(|(status, response)| {
            (
                *status,
                ResponseSpec {
                    description: response.description.clone(),
                    entity: response.entity.clone(),
                },
            )
        })
        .collect();

    debug!(handler = %handler, mask = %mask, "Endpoint record built");

    Ok(EndpointRecord {
        id: controller.endpoint_id(method),
        handler,
        methods,
        pattern: pattern.as_str().to_string(),
        mask,
        parameters,
        request_body,
        responses,
        tags: controller.merged_tags(method),
    })
}

fn parameter_spec(
    handler: &HandlerRef,
    parameter: &ParameterDeclaration,
) -> SchemaResult<ParameterSpec> {
    let kind: ParameterType =
        parameter
            .kind
            .parse()
            .map_err(|_| SchemaError::InvalidParameterType {
                handler: handler.clone(),
                parameter: parameter.name.clone(),
                value: parameter.kind.clone(),
            })?;
    let location: ParameterLocation =
        parameter
            .location
            .parse()
            .map_err(|_| SchemaError::InvalidParameterLocation {
                handler: handler.clone(),
                parameter: parameter.name.clone(),
                value: parameter.location.clone(),
            })?;

    Ok(ParameterSpec {
        name: parameter.name.clone(),
        kind,
        location,
        required: parameter.required,
        allow_empty: parameter.allow_empty,
        deprecated: parameter.deprecated,
        description: parameter.description.clone(),
        denormalizer: parameter.denormalizer.clone(),
    })
}

/// Hydrates typed records into a runtime schema, keeping record order.
///
/// # Errors
///
/// Returns [`SchemaError::MissingField`] for a record with an empty
/// handler, mask or verb list, [`SchemaError::InvalidMethod`] for an
/// unparsable verb and [`SchemaError::InvalidPattern`] for a pattern that
/// does not compile.
pub fn hydrate(records: &[EndpointRecord]) -> SchemaResult<Schema> {
    let endpoints = records
        .iter()
        .enumerate()
        .map(|(index, record)| endpoint_from_record(index, record))
        .collect::<SchemaResult<Vec<_>>>()?;

    info!(endpoints = endpoints.len(), "Schema hydrated");
    Ok(Schema::new(endpoints))
}

/// Decodes a JSON value holding a record array.
///
/// Each record is checked for the required fields before it is decoded, so
/// a missing field is reported by name rather than as a decode error.
///
/// # Errors
///
/// Returns [`SchemaError::MissingField`] for an absent required field and
/// [`SchemaError::Serialization`] when the value is not a record array.
pub fn records_from_value(value: Value) -> SchemaResult<Vec<EndpointRecord>> {
    let items: Vec<Value> = serde_json::from_value(value)?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            for (pointer, field) in REQUIRED_FIELDS {
                if item.pointer(pointer).map_or(true, Value::is_null) {
                    return Err(SchemaError::MissingField { index, field });
                }
            }
            Ok(serde_json::from_value(item)?)
        })
        .collect()
}

/// Hydrates a schema from a JSON record array.
///
/// # Errors
///
/// See [`records_from_value`] and [`hydrate`].
pub fn hydrate_json(json: &str) -> SchemaResult<Schema> {
    let value: Value = serde_json::from_str(json)?;
    hydrate(&records_from_value(value)?)
}

fn endpoint_from_record(index: usize, record: &EndpointRecord) -> SchemaResult<Endpoint> {
    if record.handler.class.is_empty() {
        return Err(SchemaError::MissingField { index, field: "handler.class" });
    }
    if record.handler.method.is_empty() {
        return Err(SchemaError::MissingField { index, field: "handler.method" });
    }
    if record.methods.is_empty() {
        return Err(SchemaError::MissingField { index, field: "methods" });
    }
    if record.mask.is_empty() {
        return Err(SchemaError::MissingField { index, field: "mask" });
    }

    let methods = record
        .methods
        .iter()
        .map(|verb| {
            parse_verb(verb).ok_or_else(|| SchemaError::InvalidMethod {
                context: format!("schema record {index}"),
                value: verb.clone(),
            })
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    let pattern = if record.pattern.is_empty() {
        PathPattern::compile(&record.mask)
    } else {
        PathPattern::from_source(&record.mask, &record.pattern)
    }
    .map_err(|source| SchemaError::InvalidPattern {
        mask: record.mask.clone(),
        source,
    })?;

    let mut endpoint = Endpoint::new(record.handler.clone(), methods, pattern);
    if !record.id.is_empty() {
        endpoint.id.clone_from(&record.id);
    }
    endpoint.parameters = record
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.clone()))
        .collect::<IndexMap<_, _>>();
    endpoint.request_body.clone_from(&record.request_body);
    endpoint.responses.clone_from(&record.responses);
    endpoint.tags.clone_from(&record.tags);
    Ok(endpoint)
}
