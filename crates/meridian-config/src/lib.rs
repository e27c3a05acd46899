//! Typed configuration for Meridian.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults or preset → files → env)
//!
//! # Overview
//!
//! [`MeridianConfig`] holds four sections:
//!
//! - [`KernelConfig`] - error catching and debug output
//! - [`RouterConfig`] - static-mask index on or off
//! - [`SchemaConfig`] - schema cache location and validation
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use meridian_config::ConfigLoader;
//!
//! # fn main() -> Result<(), meridian_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("meridian.toml")?
//!     .with_env_prefix("MERIDIAN")
//!     .load()?;
//!
//! meridian_telemetry::init_logging(&config.log_config()).ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [kernel]
//! catch_errors = true
//! debug = false
//!
//! [router]
//! indexed = true
//!
//! [schema]
//! cache_path = "var/cache/schema.json"
//! validate = true
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `MERIDIAN__KERNEL__DEBUG=true`
//! - `MERIDIAN__SCHEMA__CACHE_PATH=/tmp/schema.json`
//! - `MERIDIAN__LOGGING__LEVEL=meridian_router=debug`

#![doc(html_root_url = "https://docs.rs/meridian-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod sections;

pub use config::{MeridianConfig, MeridianConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use sections::{KernelConfig, LogFormat, LoggingConfig, RouterConfig, SchemaConfig};
