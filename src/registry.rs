//! Migration registry
//!
//! Composition root for the known form-configuration catalogue: binds the
//! fixed set of version migration steps and the matching deprecated-field
//! rules into explicitly constructed resolver/tracker instances. Nothing in
//! the library reaches for a global; an application wanting a process-wide
//! registry builds one here and threads it through.
//!
//! Catalogue history:
//!
//! - **1.0.0 → 1.1.0**: the top-level `fields` array became `items`.
//! - **1.1.0 → 1.2.0**: the top-level `config` object became `settings`.
//! - **1.2.0 → 2.0.0**: documents must declare `type` (defaulted to
//!   `"form"`) and the top-level `theme` moved under `settings.theme`.

use serde_json::{json, Value};

use crate::deprecation::{DeprecatedField, DeprecationTracker, DeprecationWarning};
use crate::error::Result;
use crate::migration::{MigrationResolver, MigrationStep};
use crate::version::{ConfigVersion, DEFAULT_VERSION};

/// Newest schema version the catalogue migrates to
pub const LATEST_VERSION: &str = "2.0.0";

/// The fixed catalogue of known migrations and deprecations
pub struct MigrationRegistry {
    resolver: MigrationResolver,
    deprecations: DeprecationTracker,
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRegistry {
    pub fn new() -> Self {
        let mut resolver = MigrationResolver::new();
        resolver.register_steps(catalogue_steps());

        let mut deprecations = DeprecationTracker::new();
        deprecations.mark_all(catalogue_deprecations());

        Self {
            resolver,
            deprecations,
        }
    }

    pub fn latest_version(&self) -> &'static str {
        LATEST_VERSION
    }

    /// Whether a document's declared version is behind the latest
    pub fn needs_migration(&self, doc: &Value) -> bool {
        let declared = doc
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_VERSION);
        match (
            ConfigVersion::parse(declared),
            ConfigVersion::parse(LATEST_VERSION),
        ) {
            (Ok(current), Ok(latest)) => current != latest,
            _ => false,
        }
    }

    /// Migrate a document through the catalogue to the latest version
    pub fn migrate_to_latest(&self, doc: Value) -> Result<Value> {
        self.resolver.migrate(doc, LATEST_VERSION)
    }

    /// Rewrite deprecated fields on a clone of the document
    pub fn migrate_deprecated(&mut self, doc: &Value) -> (Value, Vec<DeprecationWarning>) {
        self.deprecations.migrate_deprecated(doc)
    }

    pub fn resolver(&self) -> &MigrationResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut MigrationResolver {
        &mut self.resolver
    }

    pub fn deprecations(&self) -> &DeprecationTracker {
        &self.deprecations
    }

    pub fn deprecations_mut(&mut self) -> &mut DeprecationTracker {
        &mut self.deprecations
    }
}

fn catalogue_steps() -> Vec<MigrationStep> {
    vec![
        MigrationStep::new("1.0.0", "1.1.0", |mut doc| {
            if let Some(obj) = doc.as_object_mut() {
                if let Some(fields) = obj.remove("fields") {
                    obj.insert("items".to_string(), fields);
                }
            }
            doc
        })
        .expect("catalogue versions are valid")
        .with_description("Rename the top-level 'fields' array to 'items'"),
        MigrationStep::new("1.1.0", "1.2.0", |mut doc| {
            if let Some(obj) = doc.as_object_mut() {
                if let Some(config) = obj.remove("config") {
                    obj.insert("settings".to_string(), config);
                }
            }
            doc
        })
        .expect("catalogue versions are valid")
        .with_description("Rename the top-level 'config' object to 'settings'"),
        MigrationStep::new("1.2.0", "2.0.0", |mut doc| {
            if let Some(obj) = doc.as_object_mut() {
                obj.entry("type").or_insert(json!("form"));
                if let Some(theme) = obj.remove("theme") {
                    let settings = obj
                        .entry("settings")
                        .or_insert_with(|| json!({}));
                    if let Some(settings) = settings.as_object_mut() {
                        settings.insert("theme".to_string(), theme);
                    }
                }
            }
            doc
        })
        .expect("catalogue versions are valid")
        .with_description("Require a 'type' and move 'theme' under 'settings.theme'"),
    ]
}

fn catalogue_deprecations() -> Vec<DeprecatedField> {
    vec![
        DeprecatedField::new("fields", "1.1.0")
            .removed_in("2.0.0")
            .replacement("items")
            .migration(|v| v.clone()),
        DeprecatedField::new("config", "1.2.0")
            .removed_in("2.0.0")
            .replacement("settings")
            .migration(|v| v.clone()),
        DeprecatedField::new("theme", "2.0.0")
            .replacement("settings.theme")
            .migration(|v| v.clone()),
    ]
}
