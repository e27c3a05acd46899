//! Schema builder.
//!
//! The builder accumulates controller declarations incrementally and
//! exposes the result for validation and serialization. It performs no I/O.
//!
//! # Example
//!
//! ```rust
//! use meridian_schema::{
//!     ControllerDeclaration, MethodDeclaration, ParameterDeclaration, PermissiveTypes,
//!     SchemaBuilder,
//! };
//!
//! let mut builder = SchemaBuilder::new();
//! builder.add_controller(ControllerDeclaration::new("OrderController", "orders"));
//! builder
//!     .add_method(
//!         "OrderController",
//!         MethodDeclaration::new("items", "{orderId}/items", ["GET"]),
//!     )?
//!     .add_parameter(
//!         "OrderController",
//!         "items",
//!         ParameterDeclaration::path("orderId", "int"),
//!     )?;
//!
//! let schema = builder.build(&PermissiveTypes)?;
//! assert_eq!(schema.get(0).unwrap().mask(), "/orders/{orderId}/items");
//! # Ok::<(), meridian_schema::SchemaError>(())
//! ```

use indexmap::IndexMap;
use meridian_router::Schema;
use tracing::debug;

use crate::declaration::{
    ControllerDeclaration, MethodDeclaration, ParameterDeclaration, RequestBodyDeclaration,
    ResponseDeclaration,
};
use crate::error::{SchemaError, SchemaResult};
use crate::record::{self, EndpointRecord};
use crate::resolver::TypeResolver;
use crate::validate;

/// Accumulates controller declarations.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    controllers: IndexMap<String, ControllerDeclaration>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a controller, replacing any previous declaration of the same class.
    pub fn add_controller(&mut self, controller: ControllerDeclaration) -> &mut Self {
        debug!(controller = %controller.class, methods = controller.methods.len(), "Controller added");
        self.controllers.insert(controller.class.clone(), controller);
        self
    }

    /// Adds a method to a controller.
    pub fn add_method(
        &mut self,
        controller: &str,
        method: MethodDeclaration,
    ) -> SchemaResult<&mut Self> {
        let declaration = self.controller_mut(controller)?;
        declaration.methods.insert(method.name.clone(), method);
        Ok(self)
    }

    /// Adds a parameter to a method.
    pub fn add_parameter(
        &mut self,
        controller: &str,
        method: &str,
        parameter: ParameterDeclaration,
    ) -> SchemaResult<&mut Self> {
        let declaration = self.method_mut(controller, method)?;
        declaration
            .parameters
            .insert(parameter.name.clone(), parameter);
        Ok(self)
    }

    /// Adds a response to a method.
    pub fn add_response(
        &mut self,
        controller: &str,
        method: &str,
        status: u16,
        response: ResponseDeclaration,
    ) -> SchemaResult<&mut Self> {
        self.method_mut(controller, method)?
            .responses
            .insert(status, response);
        Ok(self)
    }

    /// Sets the request body of a method.
    pub fn set_request_body(
        &mut self,
        controller: &str,
        method: &str,
        body: RequestBodyDeclaration,
    ) -> SchemaResult<&mut Self> {
        self.method_mut(controller, method)?.request_body = Some(body);
        Ok(self)
    }

    /// Sets a controller tag.
    pub fn set_controller_tag(
        &mut self,
        controller: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> SchemaResult<&mut Self> {
        self.controller_mut(controller)?
            .tags
            .insert(name.into(), value.into());
        Ok(self)
    }

    /// Sets a method tag.
    pub fn set_method_tag(
        &mut self,
        controller: &str,
        method: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> SchemaResult<&mut Self> {
        self.method_mut(controller, method)?
            .tags
            .insert(name.into(), value.into());
        Ok(self)
    }

    /// Removes a tag from a controller.
    pub fn remove_controller_tag(&mut self, controller: &str, name: &str) -> SchemaResult<&mut Self> {
        self.controller_mut(controller)?.tags.remove(name);
        Ok(self)
    }

    /// Removes a tag from a method.
    pub fn remove_method_tag(
        &mut self,
        controller: &str,
        method: &str,
        name: &str,
    ) -> SchemaResult<&mut Self> {
        self.method_mut(controller, method)?.tags.remove(name);
        Ok(self)
    }

    /// Returns a controller by class.
    #[must_use]
    pub fn controller(&self, class: &str) -> Option<&ControllerDeclaration> {
        self.controllers.get(class)
    }

    /// Iterates controllers in insertion order.
    pub fn controllers(&self) -> impl Iterator<Item = &ControllerDeclaration> {
        self.controllers.values()
    }

    /// Returns the number of controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Returns the number of methods across all controllers.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.controllers.values().map(|c| c.methods.len()).sum()
    }

    /// Runs every validation pass.
    pub fn validate(&self, resolver: &dyn TypeResolver) -> SchemaResult<()> {
        validate::validate(self, resolver)
    }

    /// Validates, then serializes into hierarchy-ordered records.
    pub fn compile(&self, resolver: &dyn TypeResolver) -> SchemaResult<Vec<EndpointRecord>> {
        self.validate(resolver)?;
        record::serialize(self)
    }

    /// Validates, serializes and hydrates a runtime schema.
    pub fn build(&self, resolver: &dyn TypeResolver) -> SchemaResult<Schema> {
        record::hydrate(&self.compile(resolver)?)
    }

    fn controller_mut(&mut self, class: &str) -> SchemaResult<&mut ControllerDeclaration> {
        self.controllers
            .get_mut(class)
            .ok_or_else(|| SchemaError::UnknownController {
                controller: class.to_string(),
            })
    }

    fn method_mut(&mut self, class: &str, method: &str) -> SchemaResult<&mut MethodDeclaration> {
        self.controller_mut(class)?
            .methods
            .get_mut(method)
            .ok_or_else(|| SchemaError::UnknownMethod {
                controller: class.to_string(),
                method: method.to_string(),
            })
    }
}
