//! Configuration document versioning utilities
//!
//! Versions are three dot-separated non-negative integers (e.g. "2.0.0").
//! Parsing is lenient: a leading `v` is stripped and missing segments are
//! treated as 0, so "2" and "2.0" both mean "2.0.0". Pre-release and build
//! metadata are not part of the format and are rejected.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{EvolutionError, Result};

/// Version assumed for documents that carry no `version` field.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// A parsed configuration document version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigVersion(Version);

impl ConfigVersion {
    /// Parse from a version string
    ///
    /// Accepts one to three numeric dot-segments; missing segments default
    /// to 0. Returns [`EvolutionError::InvalidVersion`] for anything else.
    pub fn parse(version_str: &str) -> Result<Self> {
        let raw = version_str.strip_prefix('v').unwrap_or(version_str);

        let mut segments = [0u64; 3];
        let parts: Vec<&str> = raw.split('.').collect();
        if raw.is_empty() || parts.len() > 3 {
            return Err(EvolutionError::InvalidVersion(version_str.to_string()));
        }
        for (i, part) in parts.iter().enumerate() {
            segments[i] = part
                .parse::<u64>()
                .map_err(|_| EvolutionError::InvalidVersion(version_str.to_string()))?;
        }

        Ok(Self(Version::new(segments[0], segments[1], segments[2])))
    }

    /// Get the normalized version string (e.g. "1.2.3")
    pub fn version_string(&self) -> String {
        self.0.to_string()
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Check if this version lies within `[low, high]` (inclusive)
    pub fn is_between(&self, low: &ConfigVersion, high: &ConfigVersion) -> bool {
        self >= low && self <= high
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compare two version strings numerically
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(ConfigVersion::parse(a)?.cmp(&ConfigVersion::parse(b)?))
}

/// `a <= b` under numeric comparison
pub fn version_le(a: &str, b: &str) -> Result<bool> {
    Ok(compare_versions(a, b)? != Ordering::Greater)
}

/// `a >= b` under numeric comparison
pub fn version_ge(a: &str, b: &str) -> Result<bool> {
    Ok(compare_versions(a, b)? != Ordering::Less)
}

/// Inclusive range membership over version strings
pub fn is_version_between(version: &str, low: &str, high: &str) -> Result<bool> {
    let v = ConfigVersion::parse(version)?;
    Ok(v.is_between(&ConfigVersion::parse(low)?, &ConfigVersion::parse(high)?))
}
