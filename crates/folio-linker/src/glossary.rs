//! Reference glossary of people and organizations
//!
//! Loaded once per run and never mutated afterwards. File layout (JSON):
//!
//! ```json
//! { "entries": [
//!     { "id": "marx-karl-1818", "name": "Karl Marx",
//!       "variants": ["Marx, Karl"], "slugs": ["marx"], "kind": "person" }
//! ] }
//! ```
//!
//! TOML uses the same shape with `[[entries]]` tables.

use crate::error::LinkerError;
use crate::normalize::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// Kind of glossary entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person
    #[default]
    Person,
    /// A party, union, periodical or other body
    Organization,
}

impl EntityKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "organization",
        }
    }
}

/// One glossary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Canonical id (`marx-karl-1818`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Other spellings and forms of the name
    #[serde(default)]
    pub variants: Vec<String>,

    /// Archive path slugs for this entity (`marx`)
    #[serde(default)]
    pub slugs: Vec<String>,

    /// Person or organization
    #[serde(default)]
    pub kind: EntityKind,
}

impl GlossaryEntry {
    /// Create an entry without variants or slugs
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variants: Vec::new(),
            slugs: Vec::new(),
            kind,
        }
    }

    /// Add a variant spelling
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.push(variant.into());
        self
    }

    /// Add an archive slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slugs.push(slug.into());
        self
    }

    /// Display name followed by the variants
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.variants.iter().map(String::as_str))
    }
}

#[derive(Debug, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    entries: Vec<GlossaryEntry>,
}

/// Immutable glossary with a normalized name index
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: BTreeMap<String, GlossaryEntry>,
    /// Normalized name → ids carrying it
    exact: HashMap<String, Vec<String>>,
    /// Every (normalized name, id) pair, for fuzzy matching
    names: Vec<(String, String)>,
}

impl Glossary {
    /// Build a glossary from entries
    ///
    /// # Errors
    /// [`LinkerError::DuplicateId`] when two entries share an id, and
    /// [`LinkerError::InvalidEntry`] for an empty id or name
    pub fn new(entries: Vec<GlossaryEntry>) -> Result<Self, LinkerError> {
        let mut glossary = Glossary::default();

        for mut entry in entries {
            entry.id = entry.id.trim().to_string();
            let id = entry.id.clone();
            if id.is_empty() {
                return Err(LinkerError::InvalidEntry {
                    id,
                    reason: "id is empty".to_string(),
                });
            }
            if entry.name.trim().is_empty() {
                return Err(LinkerError::InvalidEntry {
                    id,
                    reason: "name is empty".to_string(),
                });
            }
            if glossary.entries.contains_key(&id) {
                return Err(LinkerError::DuplicateId(id));
            }

            for name in entry.all_names() {
                let key = normalize_name(name);
                if key.is_empty() {
                    continue;
                }
                let ids = glossary.exact.entry(key.clone()).or_default();
                if !ids.contains(&id) {
                    ids.push(id.clone());
                    glossary.names.push((key, id.clone()));
                }
            }
            glossary.entries.insert(id, entry);
        }

        Ok(glossary)
    }

    /// Parse a JSON glossary
    pub fn from_json(json: &str) -> Result<Self, LinkerError> {
        let file: GlossaryFile = serde_json::from_str(json)?;
        Self::new(file.entries)
    }

    /// Parse a TOML glossary
    pub fn from_toml(toml_str: &str) -> Result<Self, LinkerError> {
        let file: GlossaryFile = toml::from_str(toml_str)?;
        Self::new(file.entries)
    }

    /// Parse glossary text, choosing the format from a file extension
    pub fn from_str_with_extension(content: &str, extension: Option<&str>) -> Result<Self, LinkerError> {
        match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Self::from_toml(content),
            _ => Self::from_json(content),
        }
    }

    /// Load a glossary file (`.toml` as TOML, anything else as JSON)
    pub fn load(path: &Path) -> Result<Self, LinkerError> {
        let content = std::fs::read_to_string(path)?;
        let glossary =
            Self::from_str_with_extension(&content, path.extension().and_then(|e| e.to_str()))?;
        info!("Loaded glossary from {} ({} entries)", path.display(), glossary.len());
        Ok(glossary)
    }

    /// Entry by canonical id
    pub fn get(&self, id: &str) -> Option<&GlossaryEntry> {
        self.entries.get(id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the glossary has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order
    pub fn entries(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.values()
    }

    /// Archive slug → display name, for path-based author recognition
    pub fn known_slugs(&self) -> BTreeMap<String, String> {
        self.entries
            .values()
            .flat_map(|entry| {
                entry
                    .slugs
                    .iter()
                    .map(move |slug| (slug.trim().to_ascii_lowercase(), entry.name.clone()))
            })
            .filter(|(slug, _)| !slug.is_empty())
            .collect()
    }

    pub(crate) fn exact_ids(&self, normalized: &str) -> &[String] {
        self.exact.get(normalized).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn normalized_names(&self) -> &[(String, String)] {
        &self.names
    }
}
