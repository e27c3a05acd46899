//! Structural validation of a declaration graph.
//!
//! Each pass is independent and collects every violation it finds; the
//! results of all passes are returned together.

use std::collections::HashMap;

use http::Method;
use meridian_core::{HandlerRef, ParameterLocation, ParameterType};
use meridian_router::placeholder_names;
use tracing::{debug, info, warn};

use crate::builder::SchemaBuilder;
use crate::declaration::{ControllerDeclaration, MethodDeclaration};
use crate::error::{SchemaError, SchemaResult};
use crate::resolver::TypeResolver;

/// Runs every validation pass over the builder's declarations.
///
/// # Errors
///
/// Returns the single violation found, or [`SchemaError::Invalid`] holding
/// all of them when there are several.
pub fn validate(builder: &SchemaBuilder, resolver: &dyn TypeResolver) -> SchemaResult<()> {
    let mut errors = Vec::new();

    controller_contract(builder, resolver, &mut errors);
    verbs(builder, &mut errors);
    path_parameters(builder, &mut errors);
    duplicate_captures(builder, &mut errors);
    duplicate_routes(builder, &mut errors);
    parameter_vocabulary(builder, &mut errors);
    request_body_entities(builder, resolver, &mut errors);

    if errors.is_empty() {
        info!(
            controllers = builder.controller_count(),
            endpoints = builder.method_count(),
            "Schema validated"
        );
    } else {
        warn!(errors = errors.len(), "Schema validation failed");
    }
    SchemaError::from_all(errors)
}

fn methods(
    builder: &SchemaBuilder,
) -> impl Iterator<Item = (&ControllerDeclaration, &MethodDeclaration)> {
    builder
        .controllers()
        .flat_map(|c| c.methods.values().map(move |m| (c, m)))
}

fn controller_contract(
    builder: &SchemaBuilder,
    resolver: &dyn TypeResolver,
    errors: &mut Vec<SchemaError>,
) {
    for controller in builder.controllers() {
        if !resolver.is_controller(&controller.class) {
            errors.push(SchemaError::ControllerContract {
                controller: controller.class.clone(),
            });
        }
    }
}

fn verbs(builder: &SchemaBuilder, errors: &mut Vec<SchemaError>) {
    for (controller, method) in methods(builder) {
        let handler = controller.handler(method);
        if method.verbs.is_empty() {
            errors.push(SchemaError::InvalidMethod {
                context: handler.to_string(),
                value: String::new(),
            });
        }
        for verb in &method.verbs {
            if parse_verb(verb).is_none() {
                errors.push(SchemaError::InvalidMethod {
                    context: handler.to_string(),
                    value: verb.clone(),
                });
            }
        }
    }
}

fn path_parameters(builder: &SchemaBuilder, errors: &mut Vec<SchemaError>) {
    for (controller, method) in methods(builder) {
        let mask = controller.mask(method);
        let mut captures: Vec<String> = Vec::new();
        for name in placeholder_names(&mask) {
            if !captures.contains(&name) {
                captures.push(name);
            }
        }

        for name in &captures {
            let declared = method
                .parameters
                .get(name)
                .is_some_and(|p| p.location == ParameterLocation::Path.as_str());
            if !declared {
                errors.push(SchemaError::UndeclaredPathParameter {
                    handler: controller.handler(method),
                    mask: mask.clone(),
                    name: name.clone(),
                });
            }
        }

        for parameter in method.parameters.values() {
            if parameter.location == ParameterLocation::Path.as_str()
                && !captures.contains(&parameter.name)
            {
                errors.push(SchemaError::OrphanedPathParameter {
                    handler: controller.handler(method),
                    mask: mask.clone(),
                    name: parameter.name.clone(),
                });
            }
        }
    }
}

fn duplicate_captures(builder: &SchemaBuilder, errors: &mut Vec<SchemaError>) {
    for (controller, method) in methods(builder) {
        let mask = controller.mask(method);
        let names = placeholder_names(&mask);
        let mut reported: Vec<&String> = Vec::new();
        for (position, name) in names.iter().enumerate() {
            if names[..position].contains(name) && !reported.contains(&name) {
                reported.push(name);
                errors.push(SchemaError::DuplicateCapture {
                    handler: controller.handler(method),
                    mask: mask.clone(),
                    name: name.clone(),
                });
            }
        }
    }
}

fn duplicate_routes(builder: &SchemaBuilder, errors: &mut Vec<SchemaError>) {
    let mut seen: HashMap<(String, String), HandlerRef> = HashMap::new();

    for (controller, method) in methods(builder) {
        let mask = controller.mask(method);
        let handler = controller.handler(method);
        let mut verbs: Vec<String> = method
            .verbs
            .iter()
            .map(|v| v.to_ascii_uppercase())
            .collect();
        verbs.sort_unstable();
        verbs.dedup();

        for verb in verbs {
            let key = (mask.clone(), verb);
            match seen.get(&key) {
                Some(first) if *first != handler => {
                    debug!(mask = %key.0, method = %key.1, "Duplicate route");
                    errors.push(SchemaError::DuplicateRoute {
                        mask: key.0,
                        method: key.1,
                        first: first.clone(),
                        second: handler.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(key, handler.clone());
                }
            }
        }
    }
}

fn parameter_vocabulary(builder: &SchemaBuilder, errors: &mut Vec<SchemaError>) {
    for (controller, method) in methods(builder) {
        for parameter in method.parameters.values() {
            if parameter.location.parse::<ParameterLocation>().is_err() {
                errors.push(SchemaError::InvalidParameterLocation {
                    handler: controller.handler(method),
                    parameter: parameter.name.clone(),
                    value: parameter.location.clone(),
                });
            }
            if parameter.kind.parse::<ParameterType>().is_err() {
                errors.push(SchemaError::InvalidParameterType {
                    handler: controller.handler(method),
                    parameter: parameter.name.clone(),
                    value: parameter.kind.clone(),
                });
            }
        }
    }
}

fn request_body_entities(
    builder: &SchemaBuilder,
    resolver: &dyn TypeResolver,
    errors: &mut Vec<SchemaError>,
) {
    for (controller, method) in methods(builder) {
        let Some(entity) = method.request_body.as_ref().and_then(|b| b.entity.as_ref()) else {
            continue;
        };
        if !resolver.entity_exists(entity) {
            errors.push(SchemaError::UnknownEntity {
                handler: controller.handler(method),
                entity: entity.clone(),
            });
        }
    }
}

/// Parses a declared verb, accepting any case.
pub(crate) fn parse_verb(verb: &str) -> Option<Method> {
    if verb.is_empty() {
        return None;
    }
    Method::from_bytes(verb.to_ascii_uppercase().as_bytes()).ok()
}
