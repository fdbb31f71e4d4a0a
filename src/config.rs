//! Configuration for the evolution engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (formconfig.toml)
//! - Environment variables (FORMCONFIG__SECTION__KEY, e.g.
//!   FORMCONFIG__VALIDATION__DEFAULT_LEVEL)
//!
//! The library itself never reads files; loading happens only when the
//! embedding application asks for it at its composition root.
//!
//! ## Example config file (formconfig.toml):
//! ```toml
//! [validation]
//! default_level = "strict"
//! report_deprecations = true
//!
//! [migration]
//! latest_version = "2.0.0"
//! auto_migrate = true
//!
//! [performance]
//! enabled = false
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::LATEST_VERSION;
use crate::validator::ValidationLevel;

/// Main configuration for the evolution engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Migration settings
    #[serde(default)]
    pub migration: MigrationSettings,

    /// Performance monitoring settings
    #[serde(default)]
    pub performance: PerformanceSettings,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Level used when the caller does not pick one
    #[serde(default)]
    pub default_level: ValidationLevel,

    /// Append deprecation warnings under strict validation
    #[serde(default = "default_true")]
    pub report_deprecations: bool,
}

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Version documents are migrated to
    #[serde(default = "default_latest_version")]
    pub latest_version: String,

    /// Migrate incoming documents before validating them
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

/// Performance monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSettings {
    /// Record duration samples for validation/migration calls
    #[serde(default)]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_latest_version() -> String {
    LATEST_VERSION.to_string()
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            default_level: ValidationLevel::Strict,
            report_deprecations: true,
        }
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            latest_version: default_latest_version(),
            auto_migrate: true,
        }
    }
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self { enabled: false }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["formconfig.toml", ".formconfig.toml", "config/formconfig.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "formconfig", "formconfig") {
            let xdg_config = config_dir.config_dir().join("formconfig.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment variables (FORMCONFIG__SECTION__KEY)
        builder = builder.add_source(
            Environment::with_prefix("FORMCONFIG")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
