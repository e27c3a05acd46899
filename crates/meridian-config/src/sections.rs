//! Configuration sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dispatch kernel settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KernelConfig {
    /// Turn pipeline errors into responses. When off, errors reach the caller.
    #[serde(default = "default_true")]
    pub catch_errors: bool,

    /// Include internal error messages in error responses.
    #[serde(default)]
    pub debug: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            catch_errors: true,
            debug: false,
        }
    }
}

/// Router settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Build the static-mask index instead of scanning linearly.
    #[serde(default = "default_true")]
    pub indexed: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { indexed: true }
    }
}

/// Schema compilation settings.
///
/// # Example
///
/// ```
/// use meridian_config::SchemaConfig;
///
/// let config = SchemaConfig::default();
/// assert!(config.cache_path.is_none());
/// assert!(config.validate);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Where the compiled schema is cached. No caching when unset.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// Validate declarations when compiling.
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            validate: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level filter (e.g. "info", "meridian_router=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_fill_missing_fields_with_defaults() {
        let kernel: KernelConfig = toml::from_str("debug = true").unwrap();
        assert!(kernel.catch_errors);
        assert!(kernel.debug);

        let logging: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_section_field_is_rejected() {
        let result: Result<RouterConfig, _> = toml::from_str("indexd = false");
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_path_parses() {
        let schema: SchemaConfig =
            serde_json::from_str(r#"{"cache_path": "var/cache/schema.json"}"#).unwrap();
        assert_eq!(
            schema.cache_path.as_deref(),
            Some(std::path::Path::new("var/cache/schema.json"))
        );
    }
}
