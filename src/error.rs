//! Error types for the schema evolution engine

use thiserror::Error;

/// Result type for evolution operations
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Schema evolution errors
///
/// Document-level problems (bad data) are reported inside
/// [`crate::ValidationResult`] and never surface here; this enum covers
/// catalogue-level and schema-authoring mistakes, which are always returned
/// as hard errors.
#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("No migration path from version {from} to {to}")]
    NoMigrationPath { from: String, to: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Schema compilation failed: {0}")]
    SchemaCompilation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
