//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for optional record checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Accept 16-hex fingerprints carried over from legacy records
    pub allow_legacy_fingerprint: bool,

    /// Check that cross-reference and breadcrumb locators are well-formed
    pub validate_link_locators: bool,

    /// Check that word count does not exceed character count
    pub validate_text_counts: bool,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            allow_legacy_fingerprint: false,
            validate_link_locators: true,
            validate_text_counts: true,
        }
    }
}

impl GatekeeperConfig {
    /// Configuration for records migrated from the legacy flat format
    pub fn migration() -> Self {
        Self {
            allow_legacy_fingerprint: true,
            ..Self::default()
        }
    }

    /// Create a permissive configuration (required fields and bounds only)
    pub fn permissive() -> Self {
        Self {
            allow_legacy_fingerprint: true,
            validate_link_locators: false,
            validate_text_counts: false,
        }
    }
}
