//! Version migration steps and chain resolution
//!
//! A migration catalogue is an ordered collection of point-to-point steps.
//! Chain resolution is a greedy forward walk: from the document's current
//! version, repeatedly take the first registered step that starts there and
//! does not overshoot the target. The catalogue is assumed to form a simple
//! non-branching forward chain per starting version; with ambiguous
//! registrations the first registered step wins.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{EvolutionError, Result};
use crate::version::{ConfigVersion, DEFAULT_VERSION};

/// Document transform applied by a single migration step
pub type TransformFn = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// A single registered migration from one version to another
pub struct MigrationStep {
    from_version: ConfigVersion,
    to_version: ConfigVersion,
    transform: TransformFn,
    description: Option<String>,
}

impl MigrationStep {
    /// Create a new migration step
    ///
    /// Fails with [`EvolutionError::InvalidVersion`] if either endpoint is
    /// not a valid three-part numeric version.
    pub fn new<F>(from: &str, to: &str, transform: F) -> Result<Self>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Ok(Self {
            from_version: ConfigVersion::parse(from)?,
            to_version: ConfigVersion::parse(to)?,
            transform: Box::new(transform),
            description: None,
        })
    }

    /// Attach a human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn from_version(&self) -> &ConfigVersion {
        &self.from_version
    }

    pub fn to_version(&self) -> &ConfigVersion {
        &self.to_version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Apply this step's transform to a document
    pub fn apply(&self, doc: Value) -> Value {
        (self.transform)(doc)
    }
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .field("description", &self.description)
            .finish()
    }
}

/// Resolves and applies chains of migration steps
#[derive(Debug, Default)]
pub struct MigrationResolver {
    steps: Vec<MigrationStep>,
}

impl MigrationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single migration step
    ///
    /// Duplicate `(from, to)` pairs are permitted; resolution uses the first
    /// registered match.
    pub fn register_step(&mut self, step: MigrationStep) {
        debug!(
            from = %step.from_version,
            to = %step.to_version,
            "registered migration step"
        );
        self.steps.push(step);
    }

    /// Register several steps in order
    pub fn register_steps(&mut self, steps: Vec<MigrationStep>) {
        for step in steps {
            self.register_step(step);
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Resolve the chain of steps connecting `from` to `to`
    ///
    /// Greedy forward walk; an empty result signals "no path". The walk is
    /// bounded by the number of registered steps, so a cyclic catalogue
    /// resolves to "no path" rather than looping.
    pub fn resolve_chain(&self, from: &ConfigVersion, to: &ConfigVersion) -> Vec<&MigrationStep> {
        let mut chain = Vec::new();
        let mut current = from.clone();

        while current != *to {
            if chain.len() >= self.steps.len() {
                return Vec::new();
            }
            let next = self
                .steps
                .iter()
                .find(|s| s.from_version == current && s.to_version <= *to);
            match next {
                Some(step) => {
                    current = step.to_version.clone();
                    chain.push(step);
                }
                None => return Vec::new(),
            }
        }

        debug!(from = %from, to = %to, steps = chain.len(), "resolved migration chain");
        chain
    }

    /// Check whether a migration path exists between two versions
    pub fn can_migrate(&self, from: &str, to: &str) -> bool {
        match (ConfigVersion::parse(from), ConfigVersion::parse(to)) {
            (Ok(f), Ok(t)) => !self.resolve_chain(&f, &t).is_empty(),
            _ => false,
        }
    }

    /// Migrate a document to the target version
    ///
    /// Reads the document's `version` field (defaulting to "1.0.0"),
    /// short-circuits if already at the target, and otherwise folds the
    /// document through each step's transform in chain order. After every
    /// step the `version` field is force-set to that step's target, so the
    /// declared version can never desync from the applied steps.
    ///
    /// Fails with [`EvolutionError::NoMigrationPath`] when no chain exists;
    /// migration is all-or-nothing.
    pub fn migrate(&self, doc: Value, target_version: &str) -> Result<Value> {
        let current_str = doc
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_VERSION)
            .to_string();
        let current = ConfigVersion::parse(&current_str)?;
        let target = ConfigVersion::parse(target_version)?;

        if current == target {
            return Ok(doc);
        }

        let chain = self.resolve_chain(&current, &target);
        if chain.is_empty() {
            return Err(EvolutionError::NoMigrationPath {
                from: current.version_string(),
                to: target.version_string(),
            });
        }

        let mut migrated = doc;
        for step in &chain {
            migrated = step.apply(migrated);
            if let Some(obj) = migrated.as_object_mut() {
                obj.insert(
                    "version".to_string(),
                    Value::String(step.to_version.version_string()),
                );
            }
        }

        info!(
            from = %current,
            to = %target,
            steps = chain.len(),
            "migrated configuration document"
        );
        Ok(migrated)
    }
}
