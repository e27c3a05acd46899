//! Schema hashing and the on-disk schema cache.
//!
//! The cache file holds the flat record array together with two digests:
//! `source`, taken over the declarations the records were compiled from, and
//! `hash`, taken over the records themselves. A cached schema is reused only
//! when the declarations are unchanged and the records still match their
//! digest.
//!
//! ```json
//! {"source": "5f1d...", "hash": "a94a...", "endpoints": [ ... ]}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use meridian_router::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use tracing::{debug, info, warn};

use crate::builder::SchemaBuilder;
use crate::error::{SchemaError, SchemaResult};
use crate::record::{self, EndpointRecord};
use crate::resolver::TypeResolver;

/// Returns the SHA-1 hex digest of the canonical JSON form of the records.
pub fn schema_hash(records: &[EndpointRecord]) -> SchemaResult<String> {
    let bytes = serde_json::to_vec(records)?;
    Ok(hex_digest(&bytes))
}

/// Returns the SHA-1 hex digest of the builder's declarations.
pub fn declarations_hash(builder: &SchemaBuilder) -> SchemaResult<String> {
    let controllers: Vec<_> = builder.controllers().collect();
    let bytes = serde_json::to_vec(&controllers)?;
    Ok(hex_digest(&bytes))
}

fn hex_digest(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// A schema as stored in the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedSchema {
    /// Digest of the declarations the records were compiled from.
    pub source: String,
    /// Digest of the records.
    pub hash: String,
    /// The records, in hierarchy order.
    pub endpoints: Vec<EndpointRecord>,
}

#[derive(Deserialize)]
struct RawCachedSchema {
    source: String,
    hash: String,
    endpoints: Value,
}

/// A schema cache file.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    path: PathBuf,
    validate: bool,
}

impl SchemaCache {
    /// Creates a cache backed by the given file. Validation is on.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            validate: true,
        }
    }

    /// Enables or disables validation when the cache has to recompile.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache file. A missing file is `Ok(None)`.
    pub fn load(&self) -> SchemaResult<Option<CachedSchema>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SchemaError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let raw: RawCachedSchema = serde_json::from_str(&content)?;
        Ok(Some(CachedSchema {
            source: raw.source,
            hash: raw.hash,
            endpoints: record::records_from_value(raw.endpoints)?,
        }))
    }

    /// Writes records to the cache file and returns their hash.
    pub fn store(&self, source: &str, records: &[EndpointRecord]) -> SchemaResult<String> {
        let cached = CachedSchema {
            source: source.to_string(),
            hash: schema_hash(records)?,
            endpoints: records.to_vec(),
        };
        let content = serde_json::to_string_pretty(&cached)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, content).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), hash = %cached.hash, "Schema cache written");
        Ok(cached.hash)
    }

    /// Deletes the cache file if it exists.
    pub fn invalidate(&self) -> SchemaResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Hydrates the cached schema when it is current, otherwise compiles the
    /// builder, rewrites the cache and hydrates the fresh records.
    ///
    /// With validation on, the declarations are validated against `resolver`
    /// before the cache is consulted, so a file written without validation
    /// or under another resolver never bypasses it. An unreadable or corrupt
    /// cache file is treated as stale.
    pub fn load_or_compile(
        &self,
        builder: &SchemaBuilder,
        resolver: &dyn TypeResolver,
    ) -> SchemaResult<Schema> {
        if self.validate {
            builder.validate(resolver)?;
        }
        let source = declarations_hash(builder)?;

        match self.load() {
            Ok(Some(cached)) if cached.source == source => {
                if schema_hash(&cached.endpoints)? == cached.hash {
                    info!(
                        path = %self.path.display(),
                        endpoints = cached.endpoints.len(),
                        "Schema cache hit"
                    );
                    return record::hydrate(&cached.endpoints);
                }
                warn!(path = %self.path.display(), "Schema cache hash mismatch");
            }
            Ok(Some(_)) => info!(path = %self.path.display(), "Schema cache stale"),
            Ok(None) => debug!(path = %self.path.display(), "Schema cache miss"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Schema cache unreadable"),
        }

        let records = record::serialize(builder)?;
        self.store(&source, &records)?;
        record::hydrate(&records)
    }

    fn io_error(&self, source: std::io::Error) -> SchemaError {
        SchemaError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{ControllerDeclaration, MethodDeclaration};
    use crate::resolver::{KnownTypes, PermissiveTypes};

    fn builder(path: &str) -> SchemaBuilder {
        let mut builder = SchemaBuilder::new();
        builder.add_controller(
            ControllerDeclaration::new("HealthController", "/")
                .with_method(MethodDeclaration::new("check", path, ["GET"])),
        );
        builder
    }

    #[test]
    fn test_schema_hash_is_stable_and_content_sensitive() {
        let a = record::serialize(&builder("health")).unwrap();
        let b = record::serialize(&builder("health")).unwrap();
        let c = record::serialize(&builder("status")).unwrap();

        let hash = schema_hash(&a).unwrap();
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, schema_hash(&b).unwrap());
        assert_ne!(hash, schema_hash(&c).unwrap());
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path().join("schema.json"));
        assert!(cache.load().unwrap().is_none());
        assert!(cache.invalidate().is_ok());
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path().join("nested/schema.json"));
        let records = record::serialize(&builder("health")).unwrap();

        let hash = cache.store("source", &records).unwrap();
        let cached = cache.load().unwrap().unwrap();
        assert_eq!(cached.hash, hash);
        assert_eq!(cached.source, "source");
        assert_eq!(cached.endpoints, records);
    }

    #[test]
    fn test_load_or_compile_reuses_current_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path().join("schema.json"));
        let builder = builder("health");

        let first = cache.load_or_compile(&builder, &PermissiveTypes).unwrap();
        assert_eq!(first.get(0).unwrap().mask(), "/health");
        assert!(cache.path().exists());
        let written = fs::read_to_string(cache.path()).unwrap();

        let second = cache.load_or_compile(&builder, &PermissiveTypes).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(fs::read_to_string(cache.path()).unwrap(), written);
    }

    #[test]
    fn test_cache_hit_still_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        let mut builder = SchemaBuilder::new();
        builder
            .add_controller(
                ControllerDeclaration::new("ItemController", "items")
                    .with_method(MethodDeclaration::new("list", "", ["GET"])),
            )
            .add_controller(
                ControllerDeclaration::new("LegacyItemController", "items")
                    .with_method(MethodDeclaration::new("index", "", ["GET"])),
            );

        let lenient = SchemaCache::new(&path).with_validation(false);
        assert_eq!(lenient.load_or_compile(&builder, &PermissiveTypes).unwrap().len(), 2);

        let strict = SchemaCache::new(&path);
        let err = strict
            .load_or_compile(&builder, &PermissiveTypes)
            .unwrap_err();
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, SchemaError::DuplicateRoute { .. })));

        let err = strict
            .load_or_compile(&builder, &KnownTypes::new())
            .unwrap_err();
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, SchemaError::ControllerContract { .. })));
    }

    #[test]
    fn test_load_or_compile_recompiles_when_declarations_change() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path().join("schema.json"));

        cache
            .load_or_compile(&builder("health"), &PermissiveTypes)
            .unwrap();
        let schema = cache
            .load_or_compile(&builder("status"), &PermissiveTypes)
            .unwrap();
        assert_eq!(schema.get(0).unwrap().mask(), "/status");

        let cached = cache.load().unwrap().unwrap();
        assert_eq!(cached.endpoints[0].mask, "/status");
    }

    #[test]
    fn test_corrupt_cache_is_recompiled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, "{not json").unwrap();

        let cache = SchemaCache::new(&path);
        assert!(cache.load().is_err());
        let schema = cache
            .load_or_compile(&builder("health"), &PermissiveTypes)
            .unwrap();
        assert_eq!(schema.len(), 1);
        assert!(cache.load().unwrap().is_some());
    }

    #[test]
    fn test_tampered_records_are_recompiled() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path().join("schema.json"));
        let builder = builder("health");
        cache.load_or_compile(&builder, &PermissiveTypes).unwrap();

        let mut cached = cache.load().unwrap().unwrap();
        cached.endpoints[0].mask = "/tampered".to_string();
        let content = serde_json::to_string(&cached).unwrap();
        fs::write(cache.path(), content).unwrap();

        let schema = cache.load_or_compile(&builder, &PermissiveTypes).unwrap();
        assert_eq!(schema.get(0).unwrap().mask(), "/health");
    }

    #[test]
    fn test_validation_can_be_skipped_on_recompile() {
        let dir = tempfile::tempdir().unwrap();
        let strict = SchemaCache::new(dir.path().join("strict.json"));
        assert!(strict.load_or_compile(&builder("health"), &KnownTypes::new()).is_err());

        let lenient = SchemaCache::new(dir.path().join("lenient.json")).with_validation(false);
        assert!(lenient
            .load_or_compile(&builder("health"), &KnownTypes::new())
            .is_ok());
    }
}
