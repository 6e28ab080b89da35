//! Configuration for migration runs

use folio_domain::language;
use serde::{Deserialize, Serialize};

/// Configuration for the Migrator
///
/// # Examples
///
/// ```
/// use folio_migrator::MigratorConfig;
///
/// let config = MigratorConfig::default();
/// assert_eq!(config.legacy_confidence, 0.5);
/// assert!(!config.dry_run);
///
/// let config = MigratorConfig::dry_run();
/// assert!(config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Confidence attached to legacy authors and dates
    /// Default: 0.5 (original provenance unknown)
    pub legacy_confidence: f64,

    /// Language assumed when a legacy record has none
    /// Default: "en"
    pub default_language: String,

    /// Processor version stamped on migrated records
    pub processor_version: String,

    /// Dry-run mode: migrate and verify without persisting
    /// Default: false
    pub dry_run: bool,

    /// Maximum records handled per batch call; `None` for all
    /// Default: None
    pub batch_limit: Option<usize>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            legacy_confidence: 0.5,
            default_language: "en".to_string(),
            processor_version: format!("folio-migrator/{}", env!("CARGO_PKG_VERSION")),
            dry_run: false,
            batch_limit: None,
        }
    }
}

impl MigratorConfig {
    /// Check records end to end without touching the sink
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.legacy_confidence) {
            return Err(format!(
                "legacy_confidence must be between 0.0 and 1.0, got {}",
                self.legacy_confidence
            ));
        }

        if !language::is_valid(&self.default_language) {
            return Err(format!(
                "default_language must be an ISO 639-1 code, got '{}'",
                self.default_language
            ));
        }

        if self.processor_version.trim().is_empty() {
            return Err("processor_version must not be empty".to_string());
        }

        if self.batch_limit == Some(0) {
            return Err("batch_limit must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}
