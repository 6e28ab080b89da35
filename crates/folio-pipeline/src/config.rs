//! Aggregate configuration for a pipeline run
//!
//! One TOML file configures every stage:
//!
//! ```toml
//! max_workers = 8
//! glossary_path = "reference/glossary.json"
//!
//! [extractor]
//! min_detection_confidence = 0.75
//!
//! [linker]
//! fuzzy_threshold = 0.85
//!
//! [gatekeeper]
//! validate_link_locators = true
//!
//! [migrator]
//! dry_run = false
//! ```

use crate::PipelineError;
use folio_extractor::ExtractorConfig;
use folio_gatekeeper::GatekeeperConfig;
use folio_linker::LinkerConfig;
use folio_migrator::MigratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Documents processed in parallel
    pub max_workers: usize,

    /// Reference glossary for the entity linker; none means every name
    /// stays unresolved
    pub glossary_path: Option<PathBuf>,

    /// Normalization, structure and field extraction
    pub extractor: ExtractorConfig,

    /// Entity linking
    pub linker: LinkerConfig,

    /// Record validation
    pub gatekeeper: GatekeeperConfig,

    /// Legacy record migration
    pub migrator: MigratorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            glossary_path: None,
            extractor: ExtractorConfig::default(),
            linker: LinkerConfig::default(),
            gatekeeper: GatekeeperConfig::default(),
            migrator: MigratorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".to_string());
        }
        self.extractor.validate().map_err(|e| format!("extractor: {}", e))?;
        self.linker.validate().map_err(|e| format!("linker: {}", e))?;
        self.migrator.validate().map_err(|e| format!("migrator: {}", e))?;
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

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents).map_err(PipelineError::Config)?;
        config.validate().map_err(PipelineError::Config)?;
        Ok(config)
    }
}
