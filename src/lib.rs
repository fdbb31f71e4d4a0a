//! Schema Evolution & Validation Engine
//!
//! Manages the lifecycle of versioned, declarative form-configuration
//! documents: validating them against a JSON Schema (draft 2019-09),
//! detecting and migrating deprecated fields, and performing multi-step
//! version migrations with caching and instrumentation.
//!
//! ## Features
//!
//! - **Version Migration**: point-to-point migration steps resolved into
//!   chains, so documents written against older schema versions evolve
//!   forward safely
//! - **Multi-Level Validation**: strict, loose and development semantics
//!   over one compiled-validator cache
//! - **Deprecation Tracking**: dotted-path rules with optional automatic
//!   field migration
//! - **Validator Caching**: compiled schemas memoized by fingerprint, with
//!   hit/miss statistics
//! - **Instrumentation**: duration samples and percentile statistics for
//!   validation and migration paths
//!
//! ## Example
//!
//! ```
//! use formconfig::{MigrationRegistry, MultiLevelValidator, ValidationLevel};
//! use serde_json::json;
//!
//! let registry = MigrationRegistry::new();
//! let doc = json!({ "version": "1.0.0", "title": "Survey", "fields": [] });
//! let migrated = registry.migrate_to_latest(doc).unwrap();
//! assert_eq!(migrated["version"], "2.0.0");
//!
//! let schema = json!({ "type": "object", "required": ["title"] });
//! let mut validator = MultiLevelValidator::new();
//! let result = validator.validate(&migrated, &schema, ValidationLevel::Strict).unwrap();
//! assert!(result.valid);
//! ```

pub mod cache;
pub mod config;
pub mod deprecation;
pub mod error;
pub mod fingerprint;
pub mod migration;
pub mod perf;
pub mod registry;
pub mod validator;
pub mod version;

pub use cache::{CacheStats, ValidatorCache};
pub use config::EngineConfig;
pub use deprecation::{DeprecatedField, DeprecationTracker, DeprecationWarning};
pub use error::{EvolutionError, Result};
pub use fingerprint::SchemaFingerprint;
pub use migration::{MigrationResolver, MigrationStep};
pub use perf::{OperationStats, PerformanceMonitor};
pub use registry::{MigrationRegistry, LATEST_VERSION};
pub use validator::{
    CustomRule, MultiLevelValidator, ValidationError, ValidationLevel, ValidationResult,
    ValidationWarning,
};
pub use version::{ConfigVersion, DEFAULT_VERSION};
