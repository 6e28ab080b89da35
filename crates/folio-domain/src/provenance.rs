//! Provenance tags

use serde::{Deserialize, Serialize};

/// Which signal produced a field's value
///
/// Extractors consult sources in a fixed priority order; the tag of the
/// winning source is recorded next to the value and its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvenanceSource {
    /// Archive path conventions (`/archive/{author}/works/{year}/…`)
    Path,

    /// Document title text
    Title,

    /// Labelled provenance block ("Written:", "First Published:", …)
    KeywordBlock,

    /// `<meta>` tags embedded in the markup
    EmbeddedMetadata,

    /// Heuristics over body content (bylines, salutations)
    BodyContent,

    /// Manual override table
    Manual,

    /// Inferred from surrounding documents
    Inferred,

    /// Carried over from a legacy flat record
    LegacyMigrated,
}

impl ProvenanceSource {
    /// Get the tag as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceSource::Path => "path",
            ProvenanceSource::Title => "title",
            ProvenanceSource::KeywordBlock => "keyword-block",
            ProvenanceSource::EmbeddedMetadata => "embedded-metadata",
            ProvenanceSource::BodyContent => "body-content",
            ProvenanceSource::Manual => "manual",
            ProvenanceSource::Inferred => "inferred",
            ProvenanceSource::LegacyMigrated => "legacy-migrated",
        }
    }

    /// Parse a tag from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ProvenanceSource::Path),
            "title" => Some(ProvenanceSource::Title),
            "keyword-block" => Some(ProvenanceSource::KeywordBlock),
            "embedded-metadata" => Some(ProvenanceSource::EmbeddedMetadata),
            "body-content" => Some(ProvenanceSource::BodyContent),
            "manual" => Some(ProvenanceSource::Manual),
            "inferred" => Some(ProvenanceSource::Inferred),
            "legacy-migrated" => Some(ProvenanceSource::LegacyMigrated),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProvenanceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProvenanceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid provenance source: {}", s))
    }
}
