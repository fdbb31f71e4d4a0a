//! Compiled validator caching
//!
//! Schema compilation dominates validation cost, so compiled validators are
//! memoized under a schema-identity string. Identity is textual (see
//! [`SchemaFingerprint`]); eviction is explicit only.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{EvolutionError, Result};
use crate::fingerprint::SchemaFingerprint;

/// Compile a schema document under draft 2019-09
///
/// A rejected schema is a schema-authoring error and is returned as
/// [`EvolutionError::SchemaCompilation`], never swallowed.
pub fn compile_schema(schema: &Value) -> Result<JSONSchema> {
    JSONSchema::options()
        .with_draft(Draft::Draft201909)
        .compile(schema)
        .map_err(|e| EvolutionError::SchemaCompilation(e.to_string()))
}

/// Hit/miss counters for a cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Memoizing store of compiled schema validators
#[derive(Default)]
pub struct ValidatorCache {
    entries: HashMap<String, Arc<JSONSchema>>,
    hits: u64,
    misses: u64,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compiled validator for `id`, compiling `schema` on a miss
    ///
    /// A hit returns the stored validator unchanged.
    pub fn get_validator(&mut self, id: &str, schema: &Value) -> Result<Arc<JSONSchema>> {
        if let Some(validator) = self.entries.get(id) {
            self.hits += 1;
            return Ok(Arc::clone(validator));
        }

        self.misses += 1;
        debug!(id, "compiling schema validator");
        let compiled = Arc::new(compile_schema(schema)?);
        self.entries.insert(id.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Get or compile a validator keyed by the schema's fingerprint
    pub fn get_or_create_validator(&mut self, schema: &Value) -> Result<Arc<JSONSchema>> {
        let id = SchemaFingerprint::from_json(schema);
        self.get_validator(id.as_str(), schema)
    }

    /// Drop one entry; returns whether it existed
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop all entries (counters are kept)
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }

    /// `hits / (hits + misses)`, or 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("size", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        })
    }

    #[test]
    fn test_second_lookup_hits() {
        let mut cache = ValidatorCache::new();
        let first = cache.get_validator("form", &schema()).unwrap();
        let second = cache.get_validator("form", &schema()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_fingerprint_keyed_lookup() {
        let mut cache = ValidatorCache::new();
        let first = cache.get_or_create_validator(&schema()).unwrap();
        let second = cache.get_or_create_validator(&schema()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ValidatorCache::new();
        cache.get_validator("form", &schema()).unwrap();
        assert!(cache.invalidate("form"));
        assert!(!cache.invalidate("form"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = ValidatorCache::new();
        assert_eq!(cache.hit_rate(), 0.0);
        cache.get_validator("form", &schema()).unwrap();
        cache.get_validator("form", &schema()).unwrap();
        cache.get_validator("form", &schema()).unwrap();
        assert!((cache.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_schema_is_an_error() {
        let mut cache = ValidatorCache::new();
        let bad = json!({"type": "not-a-real-type"});
        assert!(matches!(
            cache.get_or_create_validator(&bad),
            Err(EvolutionError::SchemaCompilation(_))
        ));
    }

    #[test]
    fn test_compiled_validator_validates() {
        let mut cache = ValidatorCache::new();
        let validator = cache.get_or_create_validator(&schema()).unwrap();
        assert!(validator.is_valid(&json!({"title": "Survey"})));
        assert!(!validator.is_valid(&json!({})));
    }
}
