//! The legacy flat metadata record

use crate::MigrationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Flat metadata record written by the previous processor
///
/// Every field is optional so that partial records still load; which of
/// them are actually required is decided by the migration stages.
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyRecord {
    /// Document locator
    pub source_url: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Single author string
    pub author: Option<String>,
    /// Single date string, in whatever form the processor found it
    pub date: Option<String>,
    /// Language code
    pub language: Option<String>,
    /// `html` or `pdf`
    pub doc_type: Option<String>,
    /// Word count
    pub word_count: Option<u64>,
    /// Truncated content hash (16 hex)
    pub content_hash: Option<String>,
    /// Archive-relative path of the source file
    pub original_path: Option<String>,
    /// When the previous processor ran
    pub processed_date: Option<String>,
}

impl LegacyRecord {
    /// Parse one legacy record from JSON
    pub fn from_json(json: &str) -> Result<Self, MigrationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Required fields that are absent or blank, in a fixed order
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("source_url", &self.source_url),
            ("title", &self.title),
            ("content_hash", &self.content_hash),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Author, unless blank or the `Unknown` placeholder
    pub fn known_author(&self) -> Option<&str> {
        present(&self.author).filter(|a| !a.eq_ignore_ascii_case("unknown"))
    }
}

/// Trimmed value of an optional field, `None` when blank
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A legacy file that could not be read or parsed
#[derive(Debug)]
pub struct LoadFailure {
    /// Path of the offending file
    pub path: PathBuf,
    /// What went wrong
    pub error: MigrationError,
}

/// Result of loading a directory of legacy records
#[derive(Debug, Default)]
pub struct LegacyLoad {
    /// Records parsed successfully, in file-name order
    pub records: Vec<LegacyRecord>,
    /// Files that were skipped
    pub failures: Vec<LoadFailure>,
}

/// Load every `*.json` legacy record in a directory, sorted by file name
///
/// A file that cannot be read or parsed is recorded in
/// [`LegacyLoad::failures`] and the rest still load.
///
/// # Errors
/// Fails only when the directory itself cannot be listed.
pub fn load_legacy_dir(dir: &Path) -> Result<LegacyLoad, MigrationError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut load = LegacyLoad {
        records: Vec::with_capacity(paths.len()),
        failures: Vec::new(),
    };
    for path in paths {
        let parsed = std::fs::read_to_string(&path)
            .map_err(MigrationError::from)
            .and_then(|json| {
                LegacyRecord::from_json(&json)
                    .map_err(|e| MigrationError::Parse(format!("{}: {}", path.display(), e)))
            });
        match parsed {
            Ok(record) => load.records.push(record),
            Err(error) => {
                warn!("Skipping legacy file {}: {}", path.display(), error);
                load.failures.push(LoadFailure { path, error });
            }
        }
    }

    info!(
        "Loaded {} legacy records from {} ({} skipped)",
        load.records.len(),
        dir.display(),
        load.failures.len()
    );
    Ok(load)
}
