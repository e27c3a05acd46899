//! Wiring a kernel from configuration.
//!
//! [`Bootstrap`] applies a [`MeridianConfig`] to each startup step: logging,
//! schema compilation (through the cache when one is configured), router
//! construction, and the kernel's error settings.

use meridian_config::{ConfigError, ConfigLoader, MeridianConfig};
use meridian_middleware::{KernelBuilder, KernelError};
use meridian_router::{Router, Schema};
use meridian_schema::{hydrate, serialize, SchemaBuilder, SchemaCache, SchemaError, TypeResolver};
use meridian_telemetry::TelemetryError;
use thiserror::Error;
use tracing::info;

/// Default configuration file looked up by [`Bootstrap::from_env`].
pub const DEFAULT_CONFIG_FILE: &str = "meridian.toml";

/// Prefix for environment overrides read by [`Bootstrap::from_env`].
pub const ENV_PREFIX: &str = "MERIDIAN";

/// Errors raised while starting up.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The route table is broken.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The kernel could not be assembled.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Startup helper driven by a [`MeridianConfig`].
///
/// # Example
///
/// ```ignore
/// let bootstrap = Bootstrap::from_env()?;
/// bootstrap.init_logging()?;
///
/// let kernel = bootstrap
///     .kernel(&declarations, &KnownTypes::new().with_controller("UserController"))?
///     .resolver(registry)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    config: MeridianConfig,
}

impl Bootstrap {
    /// Uses the given configuration.
    #[must_use]
    pub fn new(config: MeridianConfig) -> Self {
        Self { config }
    }

    /// Loads defaults, then `meridian.toml` if present, then `.env`, then
    /// `MERIDIAN__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any layer fails to load or the result is invalid.
    pub fn from_env() -> Result<Self, BootstrapError> {
        let config = ConfigLoader::new()
            .with_optional_file(DEFAULT_CONFIG_FILE)?
            .with_dotenv()?
            .with_env_prefix(ENV_PREFIX)
            .load()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MeridianConfig {
        &self.config
    }

    /// Installs the global log subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is invalid or a subscriber is already set.
    pub fn init_logging(&self) -> Result<(), BootstrapError> {
        meridian_telemetry::init_logging(&self.config.log_config())?;
        meridian_telemetry::metrics::describe_metrics();
        Ok(())
    }

    /// Compiles the declarations into a schema.
    ///
    /// With a cache path configured, a current cache file is reused and a
    /// stale one rewritten. Validation follows `schema.validate`.
    ///
    /// # Errors
    ///
    /// Returns the schema error if validation or compilation fails.
    pub fn compile(
        &self,
        declarations: &SchemaBuilder,
        resolver: &dyn TypeResolver,
    ) -> Result<Schema, BootstrapError> {
        let settings = &self.config.schema;

        let schema = match &settings.cache_path {
            Some(path) => SchemaCache::new(path)
                .with_validation(settings.validate)
                .load_or_compile(declarations, resolver)?,
            None if settings.validate => declarations.build(resolver)?,
            None => hydrate(&serialize(declarations)?)?,
        };

        info!(
            endpoints = schema.len(),
            cached = settings.cache_path.is_some(),
            validated = settings.validate,
            "Schema ready"
        );
        Ok(schema)
    }

    /// Builds a router over `schema`, indexed or not per `router.indexed`.
    #[must_use]
    pub fn router(&self, schema: Schema) -> Router {
        if self.config.router.indexed {
            Router::with_index(schema)
        } else {
            Router::new(schema)
        }
    }

    /// Compiles the declarations and returns a kernel builder with the router
    /// and error settings applied. Add a resolver and middleware, then build.
    ///
    /// # Errors
    ///
    /// Returns the schema error if compilation fails.
    pub fn kernel(
        &self,
        declarations: &SchemaBuilder,
        resolver: &dyn TypeResolver,
    ) -> Result<KernelBuilder, BootstrapError> {
        let router = self.router(self.compile(declarations, resolver)?);
        Ok(KernelBuilder::new()
            .router(router)
            .catch_errors(self.config.kernel.catch_errors)
            .debug(self.config.kernel.debug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_config::{RouterConfig, SchemaConfig};
    use meridian_schema::{
        ControllerDeclaration, KnownTypes, MethodDeclaration, PermissiveTypes,
    };

    fn declarations() -> SchemaBuilder {
        let mut builder = SchemaBuilder::new();
        builder.add_controller(
            ControllerDeclaration::new("StatusController", "status")
                .with_method(MethodDeclaration::new("show", "", ["GET"])),
        );
        builder
    }

    #[test]
    fn test_router_follows_config() {
        let indexed = Bootstrap::default();
        assert!(indexed.router(Schema::default()).is_indexed());

        let linear = Bootstrap::new(
            MeridianConfig::builder()
                .router(RouterConfig { indexed: false })
                .build(),
        );
        assert!(!linear.router(Schema::default()).is_indexed());
    }

    #[test]
    fn test_compile_without_validation_skips_type_checks() {
        let strict = Bootstrap::default();
        assert!(matches!(
            strict.compile(&declarations(), &KnownTypes::new()),
            Err(BootstrapError::Schema(_))
        ));

        let lenient = Bootstrap::new(
            MeridianConfig::builder()
                .schema(SchemaConfig {
                    cache_path: None,
                    validate: false,
                })
                .build(),
        );
        let schema = lenient.compile(&declarations(), &KnownTypes::new()).unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_compile_writes_configured_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        let bootstrap = Bootstrap::new(
            MeridianConfig::builder()
                .schema(SchemaConfig {
                    cache_path: Some(path.clone()),
                    validate: true,
                })
                .build(),
        );

        bootstrap.compile(&declarations(), &PermissiveTypes).unwrap();
        assert!(path.exists());
    }
}
