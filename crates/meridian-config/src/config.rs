//! Top-level configuration.
//!
//! This module provides the [`MeridianConfig`] struct and its builder.

use meridian_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, KernelConfig, LogFormat, LoggingConfig, RouterConfig, SchemaConfig};

/// Complete Meridian configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use meridian_config::MeridianConfig;
///
/// let config = MeridianConfig::default();
/// assert!(config.kernel.catch_errors);
/// assert!(config.router.indexed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MeridianConfig {
    /// Dispatch kernel settings.
    #[serde(default)]
    pub kernel: KernelConfig,

    /// Router settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Schema compilation settings.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeridianConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> MeridianConfigBuilder {
        MeridianConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the log level is not a valid filter directive
    /// - the schema cache path is set but empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_config()
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        if self
            .schema
            .cache_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::invalid_value(
                "schema.cache_path",
                "must not be empty when set",
            ));
        }

        Ok(())
    }

    /// Development preset: debug logging in pretty format, error details on.
    ///
    /// # Example
    ///
    /// ```
    /// use meridian_config::MeridianConfig;
    ///
    /// let config = MeridianConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.kernel.debug);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.kernel.debug = true;
        config
    }

    /// Production preset: info logging in JSON, error details hidden.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.kernel.debug = false;
        config.schema.validate = true;
        config
    }

    /// Converts the logging section into a telemetry [`LogConfig`].
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            ..base
        }
    }
}

/// Builder for [`MeridianConfig`].
#[derive(Debug, Default)]
pub struct MeridianConfigBuilder {
    config: MeridianConfig,
}

impl MeridianConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel section.
    #[must_use]
    pub fn kernel(mut self, kernel: KernelConfig) -> Self {
        self.config.kernel = kernel;
        self
    }

    /// Set the router section.
    #[must_use]
    pub fn router(mut self, router: RouterConfig) -> Self {
        self.config.router = router;
        self
    }

    /// Set the schema section.
    #[must_use]
    pub fn schema(mut self, schema: SchemaConfig) -> Self {
        self.config.schema = schema;
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> MeridianConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = MeridianConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.validate().is_ok());

        let prod = MeridianConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(!prod.kernel.debug);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = MeridianConfig::default();
        config.logging.level = "meridian=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_rejects_empty_cache_path() {
        let config = MeridianConfig::builder()
            .schema(SchemaConfig {
                cache_path: Some(std::path::PathBuf::new()),
                validate: true,
            })
            .build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_log_config_follows_format() {
        let config = MeridianConfig::development();
        let log = config.log_config();
        assert!(!log.json_format);
        assert_eq!(log.level, "debug");

        let config = MeridianConfig::builder()
            .logging(LoggingConfig {
                enabled: false,
                level: "warn".to_string(),
                format: LogFormat::Json,
            })
            .build();
        let log = config.log_config();
        assert!(log.json_format);
        assert!(!log.enabled);
        assert_eq!(log.level, "warn");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = MeridianConfig::development();
        let text = toml::to_string(&config).unwrap();
        let parsed: MeridianConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
