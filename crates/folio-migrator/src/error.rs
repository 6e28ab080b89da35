//! Error types for migration operations

use folio_gatekeeper::SchemaValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stage of the per-record migration at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Required legacy fields checked
    Preconditions,
    /// Draft assembled through the gatekeeper
    Execute,
    /// Assembled record compared with its legacy source
    Verify,
    /// Record handed to the sink
    Finalize,
}

impl Stage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preconditions => "preconditions",
            Stage::Execute => "execute",
            Stage::Verify => "verify",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during migration
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Legacy record lacks a field the unified record cannot do without
    #[error("Missing required legacy field(s): {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    /// Gatekeeper rejected the migrated draft
    #[error(transparent)]
    Rejected(#[from] SchemaValidationError),

    /// Assembled record does not carry the legacy values
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Sink rejected the record
    #[error("Sink error: {0}")]
    Sink(String),

    /// Legacy file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Legacy file is not a legacy record
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MigrationError {
    /// The per-record stage this error belongs to
    ///
    /// Loading errors happen before any record is migrated and report
    /// as preconditions.
    pub fn stage(&self) -> Stage {
        match self {
            MigrationError::MissingRequired(_) | MigrationError::Io(_) | MigrationError::Parse(_) => {
                Stage::Preconditions
            }
            MigrationError::Rejected(_) => Stage::Execute,
            MigrationError::Verification(_) => Stage::Verify,
            MigrationError::Sink(_) => Stage::Finalize,
        }
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        MigrationError::Parse(err.to_string())
    }
}
