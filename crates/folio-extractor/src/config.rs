//! Configuration for the Extractor

use crate::extractors::classification::Taxonomy;
use serde::{Deserialize, Serialize};

/// Default site root that archive-relative paths are joined onto
pub const DEFAULT_BASE_URL: &str = "https://www.marxists.org";

/// Configuration for normalization, structural analysis and field extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum plausibility score for a statistically detected encoding
    pub min_detection_confidence: f64,

    /// Minimum links before the link-density table of contents heuristic applies
    pub toc_min_links: usize,

    /// Minimum links per paragraph for the link-density heuristic
    pub toc_link_ratio: f64,

    /// Distinct top-level titles that mark a document as an anthology
    pub anthology_min_titles: usize,

    /// Maximum keywords kept from frequency extraction
    pub max_keywords: usize,

    /// Maximum length of a description taken from body text (characters)
    pub description_max_chars: usize,

    /// Site root for archive-relative paths
    pub base_url: String,

    /// Token → category / movement mapping for classification
    pub taxonomy: Taxonomy,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err("min_detection_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.toc_min_links == 0 {
            return Err("toc_min_links must be greater than 0".to_string());
        }
        if !(self.toc_link_ratio > 0.0) {
            return Err("toc_link_ratio must be greater than 0".to_string());
        }
        if self.anthology_min_titles < 2 {
            return Err("anthology_min_titles must be at least 2".to_string());
        }
        if self.max_keywords == 0 {
            return Err("max_keywords must be greater than 0".to_string());
        }
        if self.description_max_chars == 0 {
            return Err("description_max_chars must be greater than 0".to_string());
        }
        let lowered = self.base_url.to_ascii_lowercase();
        if !(lowered.starts_with("http://") || lowered.starts_with("https://"))
            || !folio_domain::locator::is_well_formed(&self.base_url)
        {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.75,
            toc_min_links: 8,
            toc_link_ratio: 2.0,
            anthology_min_titles: 3,
            max_keywords: 10,
            description_max_chars: 280,
            base_url: DEFAULT_BASE_URL.to_string(),
            taxonomy: Taxonomy::default(),
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: reject doubtful encodings, demand stronger structural evidence
    pub fn strict() -> Self {
        Self {
            min_detection_confidence: 0.9,
            toc_min_links: 12,
            toc_link_ratio: 3.0,
            anthology_min_titles: 4,
            ..Self::default()
        }
    }

    /// Lenient preset: accept weaker detections and structural signals
    pub fn lenient() -> Self {
        Self {
            min_detection_confidence: 0.5,
            toc_min_links: 5,
            toc_link_ratio: 1.5,
            anthology_min_titles: 2,
            max_keywords: 20,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
