//! Error types for the Entity Linker

use thiserror::Error;

/// Errors raised while loading a glossary
///
/// Linking itself never fails: a name that matches nothing is
/// [`crate::Resolution::Unresolved`].
#[derive(Error, Debug)]
pub enum LinkerError {
    /// Glossary file could not be read
    #[error("Failed to read glossary: {0}")]
    Io(#[from] std::io::Error),

    /// Glossary content could not be parsed
    #[error("Failed to parse glossary: {0}")]
    Parse(String),

    /// Two entries share a canonical id
    #[error("Duplicate glossary id: {0}")]
    DuplicateId(String),

    /// An entry is unusable (empty id or name)
    #[error("Invalid glossary entry '{id}': {reason}")]
    InvalidEntry {
        /// Canonical id of the entry
        id: String,
        /// What is wrong with it
        reason: String,
    },
}

impl From<serde_json::Error> for LinkerError {
    fn from(e: serde_json::Error) -> Self {
        LinkerError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for LinkerError {
    fn from(e: toml::de::Error) -> Self {
        LinkerError::Parse(e.to_string())
    }
}
