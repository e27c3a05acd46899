//! # Meridian Core
//!
//! Core types shared by every Meridian crate:
//!
//! - [`MeridianError`] - Request-time error taxonomy with HTTP status mapping
//! - [`ErrorCategory`] - Error classification used for status codes and envelopes
//! - [`HandlerRef`] - The (controller, method) pair that identifies a handler
//! - [`ParameterLocation`] / [`ParameterType`] - The closed parameter vocabularies
//! - [`path`] - Mask and request path normalization

#![doc(html_root_url = "https://docs.rs/meridian-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod path;
mod types;

pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, MeridianError, MeridianResult};
pub use path::{join_paths, normalize_path};
pub use types::{HandlerRef, ParameterLocation, ParameterType, ParseVocabularyError};
