//! End-to-end tests for the evolution pipeline
//!
//! Exercises the full flow: a legacy document goes through the migration
//! registry, the result is validated at each level, and the whole run is
//! timed through the performance monitor.

use formconfig::{
    DeprecatedField, DeprecationTracker, MigrationRegistry, MultiLevelValidator,
    PerformanceMonitor, ValidationLevel, ValidatorCache, LATEST_VERSION,
};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn form_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2019-09/schema",
        "type": "object",
        "properties": {
            "version": { "type": "string" },
            "title": { "type": "string" },
            "type": { "type": "string", "enum": ["form", "survey"] },
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "label": { "type": "string" }
                    },
                    "required": ["id"]
                }
            },
            "settings": { "type": "object" }
        },
        "required": ["title", "type", "items"]
    })
}

fn legacy_document() -> Value {
    json!({
        "version": "1.0.0",
        "title": "Customer survey",
        "fields": [
            { "id": "q1", "label": "How did you hear about us?" },
            { "id": "q2", "label": "Anything else?" }
        ],
        "config": { "columns": 2 },
        "theme": "dark"
    })
}

// =============================================================================
// Migrate-then-validate pipeline
// =============================================================================

#[test]
fn test_legacy_document_migrates_and_validates_strict() {
    init_tracing();

    let registry = MigrationRegistry::new();
    let doc = legacy_document();
    assert!(registry.needs_migration(&doc));

    let migrated = registry.migrate_to_latest(doc).unwrap();
    assert_eq!(migrated["version"], LATEST_VERSION);

    let mut validator = MultiLevelValidator::new();
    let result = validator
        .validate(&migrated, &form_schema(), ValidationLevel::Strict)
        .unwrap();
    assert!(result.valid, "errors: {:?}", result.errors);
    assert!(!registry.needs_migration(&migrated));
}

#[test]
fn test_unmigrated_legacy_document_fails_strict_but_passes_development() {
    init_tracing();

    let mut validator = MultiLevelValidator::new();
    let doc = legacy_document();

    let strict = validator
        .validate(&doc, &form_schema(), ValidationLevel::Strict)
        .unwrap();
    assert!(!strict.valid);

    let development = validator
        .validate(&doc, &form_schema(), ValidationLevel::Development)
        .unwrap();
    assert!(development.valid);
}

#[test]
fn test_deprecation_warnings_surface_through_validation() {
    init_tracing();

    let mut tracker = DeprecationTracker::new();
    tracker.mark_deprecated(
        DeprecatedField::new("theme", "2.0.0").replacement("settings.theme"),
    );
    let mut validator = MultiLevelValidator::new().with_deprecations(tracker);

    let doc = json!({
        "title": "Survey",
        "type": "form",
        "items": [],
        "theme": "dark"
    });
    let result = validator
        .validate(&doc, &form_schema(), ValidationLevel::Strict)
        .unwrap();
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].suggestion.as_deref(),
        Some("Use \"settings.theme\" instead")
    );
}

// =============================================================================
// Shared cache and instrumentation
// =============================================================================

#[test]
fn test_shared_cache_is_reused_across_levels() {
    init_tracing();

    let mut validator = MultiLevelValidator::new().with_cache(ValidatorCache::new());
    let doc = json!({"title": "x", "type": "form", "items": []});

    for _ in 0..2 {
        validator
            .validate(&doc, &form_schema(), ValidationLevel::Strict)
            .unwrap();
        validator
            .validate(&doc, &form_schema(), ValidationLevel::Loose)
            .unwrap();
    }

    // One entry for the schema as given, one for the relaxed variant.
    let stats = validator.cache().stats();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
    assert!(validator.cache().hit_rate() > 0.0);
}

#[test]
fn test_pipeline_is_measurable() {
    init_tracing();

    let registry = MigrationRegistry::new();
    let mut validator = MultiLevelValidator::new();
    let mut monitor = PerformanceMonitor::new();
    let schema = form_schema();

    for _ in 0..5 {
        let migrated = monitor
            .measure("migration.to_latest", || {
                registry.migrate_to_latest(legacy_document())
            })
            .unwrap();
        let result = monitor
            .measure("validate.strict", || {
                validator.validate(&migrated, &schema, ValidationLevel::Strict)
            })
            .unwrap();
        assert!(result.valid);
    }

    let stats = monitor.stats("validate.strict").unwrap();
    assert_eq!(stats.count, 5);
    assert!(stats.min_ms <= stats.average_ms && stats.average_ms <= stats.max_ms);

    let report = monitor.report();
    assert!(report.contains("migration.to_latest"));
    assert!(report.contains("validate.strict"));
}

#[test]
fn test_migration_preserves_document_content() {
    init_tracing();

    let registry = MigrationRegistry::new();
    let original = legacy_document();
    let migrated = registry.migrate_to_latest(original.clone()).unwrap();

    // Item content rides through every step untouched.
    assert_eq!(migrated["items"], original["fields"]);
    assert_eq!(migrated["settings"]["columns"], original["config"]["columns"]);
    assert_eq!(migrated["settings"]["theme"], original["theme"]);
    assert_eq!(migrated["title"], original["title"]);
}
