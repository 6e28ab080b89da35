//! Configuration for the Entity Linker

use serde::{Deserialize, Serialize};

/// Configuration for name resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Similarity a fuzzy match must strictly exceed
    pub fuzzy_threshold: f64,

    /// Whether fuzzy matching runs at all (exact matches only when off)
    pub fuzzy_enabled: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_enabled: true,
        }
    }
}

impl LinkerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.fuzzy_threshold) {
            return Err("fuzzy_threshold must be in [0.0, 1.0)".to_string());
        }
        Ok(())
    }

    /// Exact matches only
    pub fn exact_only() -> Self {
        Self {
            fuzzy_enabled: false,
            ..Self::default()
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkerConfig::default();
        assert_eq!(config.fuzzy_threshold, 0.85);
        assert!(config.fuzzy_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = LinkerConfig::default();
        config.fuzzy_threshold = 1.0;
        assert!(config.validate().is_err());
        config.fuzzy_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial() {
        let config = LinkerConfig::from_toml("fuzzy_threshold = 0.9").unwrap();
        assert_eq!(config.fuzzy_threshold, 0.9);
        assert!(config.fuzzy_enabled);
        let back = LinkerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
