//! Multi-level configuration document validation
//!
//! One validator, three enforcement levels:
//!
//! - **Strict**: the schema as given, every structural error reported,
//!   custom rules applied, deprecation warnings appended.
//! - **Loose**: top-level `required` relaxed to the critical subset
//!   (`type`, `items`); only critical structural errors stay hard errors,
//!   the rest are downgraded to warnings.
//! - **Development**: no schema compilation at all; an object-shape check
//!   plus soft warnings for missing recommended fields. For authoring
//!   iteration, not gatekeeping.
//!
//! Warnings never affect `valid` at any level.

use jsonschema::error::ValidationErrorKind;
use jsonschema::paths::JSONPointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::ValidatorCache;
use crate::deprecation::{DeprecationTracker, DeprecationWarning};
use crate::error::Result;

/// Fields that stay required under loose validation
const CRITICAL_REQUIRED: &[&str] = &["type", "items"];

/// Fields a well-authored form configuration should carry
const RECOMMENDED_FIELDS: &[&str] = &["title", "description"];

/// How strictly structural errors are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    #[default]
    Strict,
    Loose,
    Development,
}

/// A hard structural (or custom-rule) error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted path of the offending field; empty string for the root
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A soft finding that never affects validity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<DeprecationWarning> for ValidationWarning {
    fn from(w: DeprecationWarning) -> Self {
        Self {
            field: w.field,
            message: w.message,
            suggestion: w.suggestion,
        }
    }
}

/// Outcome of a single validate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    fn passed(warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings,
        }
    }
}

/// A caller-supplied predicate applied under strict validation
pub struct CustomRule {
    field: String,
    message: String,
    check: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl CustomRule {
    /// `check` receives the value at `field` (or `Value::Null` when absent)
    /// and returns whether the rule passes.
    pub fn new<F>(field: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            message: message.into(),
            check: Box::new(check),
        }
    }
}

impl std::fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomRule")
            .field("field", &self.field)
            .field("message", &self.message)
            .finish()
    }
}

/// Validates configuration documents at a chosen enforcement level
///
/// Owns its compiled-validator cache and deprecation tracker; both are
/// injectable through the `with_*` constructors so an application can share
/// one cache (and one catalogue of deprecation rules) across components.
#[derive(Debug)]
pub struct MultiLevelValidator {
    cache: ValidatorCache,
    deprecations: DeprecationTracker,
    custom_rules: Vec<CustomRule>,
    report_deprecations: bool,
}

impl Default for MultiLevelValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiLevelValidator {
    pub fn new() -> Self {
        Self {
            cache: ValidatorCache::new(),
            deprecations: DeprecationTracker::new(),
            custom_rules: Vec::new(),
            report_deprecations: true,
        }
    }

    /// Use an existing validator cache instead of a private one
    pub fn with_cache(mut self, cache: ValidatorCache) -> Self {
        self.cache = cache;
        self
    }

    /// Use an existing deprecation tracker instead of an empty one
    pub fn with_deprecations(mut self, tracker: DeprecationTracker) -> Self {
        self.deprecations = tracker;
        self
    }

    pub fn add_custom_rule(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Suppress (or restore) deprecation warnings under strict validation
    pub fn set_report_deprecations(&mut self, report: bool) {
        self.report_deprecations = report;
    }

    pub fn cache(&self) -> &ValidatorCache {
        &self.cache
    }

    pub fn deprecations(&self) -> &DeprecationTracker {
        &self.deprecations
    }

    pub fn deprecations_mut(&mut self) -> &mut DeprecationTracker {
        &mut self.deprecations
    }

    /// Validate a document against a schema at the given level
    ///
    /// Structural problems are reported inside the result; only schema
    /// compilation failures surface as `Err`.
    pub fn validate(
        &mut self,
        doc: &Value,
        schema: &Value,
        level: ValidationLevel,
    ) -> Result<ValidationResult> {
        match level {
            ValidationLevel::Strict => self.validate_strict(doc, schema),
            ValidationLevel::Loose => self.validate_loose(doc, schema),
            ValidationLevel::Development => Ok(self.validate_development(doc)),
        }
    }

    fn validate_strict(&mut self, doc: &Value, schema: &Value) -> Result<ValidationResult> {
        let validator = self.cache.get_or_create_validator(schema)?;

        let mut errors = Vec::new();
        if let Err(violations) = validator.validate(doc) {
            for violation in violations {
                errors.push(structural_error(&violation));
            }
        }

        for rule in &self.custom_rules {
            let value = value_at_path(doc, &rule.field);
            if !(rule.check)(value.unwrap_or(&Value::Null)) {
                errors.push(ValidationError {
                    field: rule.field.clone(),
                    message: rule.message.clone(),
                    value: value.cloned(),
                });
            }
        }

        let mut warnings = Vec::new();
        if self.report_deprecations {
            warnings.extend(
                self.deprecations
                    .check_deprecations(doc)
                    .into_iter()
                    .map(ValidationWarning::from),
            );
        }

        Ok(ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        })
    }

    fn validate_loose(&mut self, doc: &Value, schema: &Value) -> Result<ValidationResult> {
        let relaxed = relax_schema(schema);
        let validator = self.cache.get_or_create_validator(&relaxed)?;

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        if let Err(violations) = validator.validate(doc) {
            for violation in violations {
                if is_critical(&violation) {
                    errors.push(structural_error(&violation));
                } else {
                    warnings.push(ValidationWarning {
                        field: error_field(&violation),
                        message: violation.to_string(),
                        suggestion: None,
                    });
                }
            }
        }

        Ok(ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        })
    }

    fn validate_development(&self, doc: &Value) -> ValidationResult {
        if !doc.is_object() {
            return ValidationResult {
                valid: false,
                errors: vec![ValidationError {
                    field: String::new(),
                    message: "Configuration must be a non-null object".to_string(),
                    value: None,
                }],
                warnings: Vec::new(),
            };
        }

        let warnings = RECOMMENDED_FIELDS
            .iter()
            .filter(|field| doc.get(**field).is_none())
            .map(|field| ValidationWarning {
                field: (*field).to_string(),
                message: format!("Missing recommended field '{}'", field),
                suggestion: Some(format!("Add '{}' to improve the authoring experience", field)),
            })
            .collect();

        ValidationResult::passed(warnings)
    }
}

/// Clone the schema with its top-level `required` filtered down to the
/// critical subset
fn relax_schema(schema: &Value) -> Value {
    let mut relaxed = schema.clone();
    if let Some(required) = relaxed.get_mut("required").and_then(Value::as_array_mut) {
        required.retain(|entry| {
            entry
                .as_str()
                .map(|name| CRITICAL_REQUIRED.contains(&name))
                .unwrap_or(false)
        });
    }
    relaxed
}

fn is_critical(violation: &jsonschema::ValidationError<'_>) -> bool {
    match &violation.kind {
        ValidationErrorKind::Type { .. } | ValidationErrorKind::Enum { .. } => true,
        ValidationErrorKind::Required { property } => property
            .as_str()
            .map(|name| CRITICAL_REQUIRED.contains(&name))
            .unwrap_or(false),
        _ => false,
    }
}

fn structural_error(violation: &jsonschema::ValidationError<'_>) -> ValidationError {
    ValidationError {
        field: error_field(violation),
        message: violation.to_string(),
        value: Some(violation.instance.as_ref().clone()),
    }
}

/// Dotted field path for a structural violation
///
/// Missing-required errors point at the containing object, so the missing
/// property name is appended to the path.
fn error_field(violation: &jsonschema::ValidationError<'_>) -> String {
    let base = dotted_path(&violation.instance_path);
    if let ValidationErrorKind::Required { property } = &violation.kind {
        if let Some(name) = property.as_str() {
            return if base.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", base, name)
            };
        }
    }
    base
}

fn dotted_path(pointer: &JSONPointer) -> String {
    pointer
        .to_string()
        .trim_start_matches('/')
        .replace('/', ".")
}

fn value_at_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = doc;
    for part in path.split('.') {
        node = node.get(part)?;
    }
    Some(node)
}
