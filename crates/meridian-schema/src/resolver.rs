//! Type resolution for validation.
//!
//! The validator never inspects code itself. Whether a controller type
//! satisfies the controller contract, and whether a referenced entity
//! exists, is answered by a [`TypeResolver`] supplied by the caller.

use std::collections::HashSet;

/// Answers type questions the validator cannot answer on its own.
pub trait TypeResolver: Send + Sync {
    /// Returns true if the type implements the controller contract.
    fn is_controller(&self, class: &str) -> bool;

    /// Returns true if the entity type can be resolved.
    fn entity_exists(&self, entity: &str) -> bool;
}

/// A resolver that accepts every type.
///
/// Useful when declarations come from a trusted source that already checked
/// its own types.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveTypes;

impl TypeResolver for PermissiveTypes {
    fn is_controller(&self, _class: &str) -> bool {
        true
    }

    fn entity_exists(&self, _entity: &str) -> bool {
        true
    }
}

/// A resolver backed by explicit sets of known types.
///
/// # Example
///
/// ```rust
/// use meridian_schema::{KnownTypes, TypeResolver};
///
/// let types = KnownTypes::new()
///     .with_controller("OrderController")
///     .with_entity("Order");
///
/// assert!(types.is_controller("OrderController"));
/// assert!(!types.entity_exists("Invoice"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    controllers: HashSet<String>,
    entities: HashSet<String>,
}

impl KnownTypes {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller type.
    pub fn with_controller(mut self, class: impl Into<String>) -> Self {
        self.controllers.insert(class.into());
        self
    }

    /// Registers an entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.insert(entity.into());
        self
    }

    /// Registers a controller type in place.
    pub fn add_controller(&mut self, class: impl Into<String>) {
        self.controllers.insert(class.into());
    }

    /// Registers an entity type in place.
    pub fn add_entity(&mut self, entity: impl Into<String>) {
        self.entities.insert(entity.into());
    }
}

impl TypeResolver for KnownTypes {
    fn is_controller(&self, class: &str) -> bool {
        self.controllers.contains(class)
    }

    fn entity_exists(&self, entity: &str) -> bool {
        self.entities.contains(entity)
    }
}
