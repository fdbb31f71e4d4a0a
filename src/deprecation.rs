//! Deprecated field tracking and migration
//!
//! Rules are keyed by exact dot-joined field paths ("display.theme"); there
//! is no prefix or glob matching, so every nesting depth that should be
//! flagged must be registered explicitly. The configuration walk descends
//! object keys only; arrays are opaque leaves for path matching.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Value transform applied when auto-migrating a deprecated field
pub type MigrationHelper = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// A registered deprecation rule for one dotted field path
pub struct DeprecatedField {
    field_name: String,
    deprecated_in: String,
    removed_in: Option<String>,
    replacement: Option<String>,
    message: Option<String>,
    migration: Option<MigrationHelper>,
}

impl DeprecatedField {
    pub fn new(field_name: impl Into<String>, deprecated_in: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            deprecated_in: deprecated_in.into(),
            removed_in: None,
            replacement: None,
            message: None,
            migration: None,
        }
    }

    /// Version in which the field will be (or was) removed
    pub fn removed_in(mut self, version: impl Into<String>) -> Self {
        self.removed_in = Some(version.into());
        self
    }

    /// Dotted path of the field that replaces this one
    pub fn replacement(mut self, path: impl Into<String>) -> Self {
        self.replacement = Some(path.into());
        self
    }

    /// Custom warning message; overrides the synthesized one
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Value transform used by [`DeprecationTracker::migrate_deprecated`]
    pub fn migration<F>(mut self, helper: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.migration = Some(Box::new(helper));
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn deprecated_in_version(&self) -> &str {
        &self.deprecated_in
    }

    pub fn replacement_path(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    pub fn removed_in_version(&self) -> Option<&str> {
        self.removed_in.as_deref()
    }

    fn warning_message(&self) -> String {
        if let Some(custom) = &self.message {
            return custom.clone();
        }
        let mut msg = format!(
            "Field '{}' is deprecated since {}",
            self.field_name, self.deprecated_in
        );
        if let Some(removed) = &self.removed_in {
            msg.push_str(&format!(", removed in {}", removed));
        }
        if let Some(replacement) = &self.replacement {
            msg.push_str(&format!(", use '{}' instead", replacement));
        }
        msg
    }
}

impl std::fmt::Debug for DeprecatedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeprecatedField")
            .field("field_name", &self.field_name)
            .field("deprecated_in", &self.deprecated_in)
            .field("removed_in", &self.removed_in)
            .field("replacement", &self.replacement)
            .field("has_migration", &self.migration.is_some())
            .finish()
    }
}

/// A warning produced for one occurrence of a deprecated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Registry of deprecation rules plus the tree walk that applies them
#[derive(Debug, Default)]
pub struct DeprecationTracker {
    rules: HashMap<String, DeprecatedField>,
    /// Paths already logged; dedups the diagnostic sink, never the results
    shown: HashSet<String>,
}

impl DeprecationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule; a later registration for the same path wins
    pub fn mark_deprecated(&mut self, rule: DeprecatedField) {
        self.rules.insert(rule.field_name.clone(), rule);
    }

    /// Register several rules
    pub fn mark_all(&mut self, rules: Vec<DeprecatedField>) {
        for rule in rules {
            self.mark_deprecated(rule);
        }
    }

    pub fn is_deprecated(&self, path: &str) -> bool {
        self.rules.contains_key(path)
    }

    pub fn get_info(&self, path: &str) -> Option<&DeprecatedField> {
        self.rules.get(path)
    }

    pub fn all(&self) -> Vec<&DeprecatedField> {
        self.rules.values().collect()
    }

    /// Forget which paths have been logged already
    pub fn reset_warning_log(&mut self) {
        self.shown.clear();
    }

    /// Find all deprecated field occurrences in a document
    ///
    /// Non-object input yields an empty list.
    pub fn check_deprecations(&mut self, doc: &Value) -> Vec<DeprecationWarning> {
        self.check_deprecations_with_prefix(doc, "")
    }

    /// Same as [`check_deprecations`](Self::check_deprecations), with all
    /// computed paths rooted under `prefix`
    pub fn check_deprecations_with_prefix(
        &mut self,
        doc: &Value,
        prefix: &str,
    ) -> Vec<DeprecationWarning> {
        let mut warnings = Vec::new();
        self.walk(doc, prefix, &mut warnings);
        warnings
    }

    fn walk(&mut self, value: &Value, prefix: &str, warnings: &mut Vec<DeprecationWarning>) {
        let Some(obj) = value.as_object() else {
            return;
        };
        for (key, child) in obj {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            let warning = self.rules.get(&path).map(|rule| DeprecationWarning {
                field: path.clone(),
                message: rule.warning_message(),
                suggestion: rule
                    .replacement
                    .as_ref()
                    .map(|r| format!("Use \"{}\" instead", r)),
            });
            if let Some(warning) = warning {
                if self.shown.insert(path.clone()) {
                    warn!(field = %path, "{}", warning.message);
                }
                warnings.push(warning);
            }

            // Objects only; arrays stay opaque for path matching.
            if child.is_object() {
                self.walk(child, &path, warnings);
            }
        }
    }

    /// Rewrite deprecated fields on a clone of the document
    ///
    /// Warnings are computed against the original, which is never mutated.
    /// Only rules carrying a migration helper rewrite anything: the old key
    /// is removed and, when a replacement path is set, the transformed value
    /// is written there (creating intermediate objects as needed).
    pub fn migrate_deprecated(&mut self, doc: &Value) -> (Value, Vec<DeprecationWarning>) {
        let warnings = self.check_deprecations(doc);
        let mut migrated = doc.clone();

        for warning in &warnings {
            let Some(rule) = self.rules.get(&warning.field) else {
                continue;
            };
            let Some(helper) = &rule.migration else {
                continue;
            };
            if let Some(old_value) = remove_path(&mut migrated, &warning.field) {
                let new_value = helper(&old_value);
                if let Some(replacement) = &rule.replacement {
                    set_path(&mut migrated, replacement, new_value);
                }
            }
        }

        (migrated, warnings)
    }
}

/// Remove the value at a dotted path, returning it if present
fn remove_path(doc: &mut Value, path: &str) -> Option<Value> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop()?;
    let mut node = doc;
    for part in parts {
        node = node.get_mut(part)?;
    }
    node.as_object_mut()?.remove(last)
}

/// Write a value at a dotted path, creating intermediate objects
fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut node = doc;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let Some(obj) = node.as_object_mut() else {
            return;
        };
        if parts.peek().is_none() {
            obj.insert(part.to_string(), value);
            return;
        }
        node = obj
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tracker() -> DeprecationTracker {
        let mut tracker = DeprecationTracker::new();
        tracker.mark_all(vec![
            DeprecatedField::new("theme", "1.2.0")
                .removed_in("2.0.0")
                .replacement("display.theme")
                .migration(|v| v.clone()),
            DeprecatedField::new("display.legacy_mode", "1.4.0"),
            DeprecatedField::new("layout", "1.5.0")
                .message("Use the display block for layout settings"),
        ]);
        tracker
    }

    #[test]
    fn test_check_finds_top_level_and_nested_paths() {
        let mut tracker = tracker();
        let doc = json!({
            "theme": "dark",
            "display": { "legacy_mode": true },
            "title": "Survey"
        });
        let mut fields: Vec<String> = tracker
            .check_deprecations(&doc)
            .into_iter()
            .map(|w| w.field)
            .collect();
        fields.sort();
        assert_eq!(fields, vec!["display.legacy_mode", "theme"]);
    }

    #[test]
    fn test_synthesized_message_and_suggestion() {
        let mut tracker = tracker();
        let warnings = tracker.check_deprecations(&json!({"theme": "dark"}));
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "Field 'theme' is deprecated since 1.2.0, removed in 2.0.0, use 'display.theme' instead"
        );
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("Use \"display.theme\" instead")
        );
    }

    #[test]
    fn test_custom_message_wins() {
        let mut tracker = tracker();
        let warnings = tracker.check_deprecations(&json!({"layout": "grid"}));
        assert_eq!(warnings[0].message, "Use the display block for layout settings");
        assert!(warnings[0].suggestion.is_none());
    }

    #[test]
    fn test_arrays_are_opaque() {
        let mut tracker = DeprecationTracker::new();
        tracker.mark_deprecated(DeprecatedField::new("items.theme", "1.0.0"));
        let doc = json!({"items": [{"theme": "dark"}]});
        assert!(tracker.check_deprecations(&doc).is_empty());
    }

    #[test]
    fn test_non_object_input_yields_no_warnings() {
        let mut tracker = tracker();
        assert!(tracker.check_deprecations(&json!(null)).is_empty());
        assert!(tracker.check_deprecations(&json!([1, 2, 3])).is_empty());
        assert!(tracker.check_deprecations(&json!("theme")).is_empty());
    }

    #[test]
    fn test_check_is_idempotent_despite_log_dedup() {
        let mut tracker = tracker();
        let doc = json!({"theme": "dark", "display": {"legacy_mode": true}});
        let first = tracker.check_deprecations(&doc);
        let second = tracker.check_deprecations(&doc);
        assert_eq!(first, second);
        tracker.reset_warning_log();
        assert_eq!(tracker.check_deprecations(&doc), first);
    }

    #[test]
    fn test_migrate_rewrites_with_helper() {
        let mut tracker = tracker();
        let original = json!({"theme": "dark", "title": "Survey"});
        let (migrated, warnings) = tracker.migrate_deprecated(&original);

        assert_eq!(warnings.len(), 1);
        assert!(migrated.get("theme").is_none());
        assert_eq!(migrated["display"]["theme"], "dark");
        assert_eq!(migrated["title"], "Survey");
        // Input is untouched.
        assert_eq!(original["theme"], "dark");
        assert!(original.get("display").is_none());
    }

    #[test]
    fn test_migrate_leaves_fields_without_helper() {
        let mut tracker = tracker();
        let original = json!({"layout": "grid"});
        let (migrated, warnings) = tracker.migrate_deprecated(&original);
        assert_eq!(warnings.len(), 1);
        assert_eq!(migrated["layout"], "grid");
    }

    #[test]
    fn test_migrate_without_replacement_drops_field() {
        let mut tracker = DeprecationTracker::new();
        tracker.mark_deprecated(
            DeprecatedField::new("debug", "1.1.0").migration(|v| v.clone()),
        );
        let (migrated, _) = tracker.migrate_deprecated(&json!({"debug": true}));
        assert!(migrated.get("debug").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut tracker = DeprecationTracker::new();
        tracker.mark_deprecated(DeprecatedField::new("theme", "1.0.0"));
        tracker.mark_deprecated(DeprecatedField::new("theme", "1.2.0"));
        assert_eq!(
            tracker.get_info("theme").map(|r| r.deprecated_in_version()),
            Some("1.2.0")
        );
    }

    #[test]
    fn test_query_helpers() {
        let tracker = tracker();
        assert!(tracker.is_deprecated("theme"));
        assert!(!tracker.is_deprecated("display.theme"));
        assert_eq!(tracker.all().len(), 3);
    }
}
