//! Error types for pipeline operations

use folio_extractor::ExtractorError;
use folio_gatekeeper::SchemaValidationError;
use folio_linker::LinkerError;
use thiserror::Error;

/// Errors that can occur while processing documents
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Document bytes could not be normalized
    #[error("Encoding error: {0}")]
    Encoding(#[from] ExtractorError),

    /// Draft failed validation
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    /// Processing task panicked or was aborted
    #[error("Task join error: {0}")]
    Join(String),

    /// Work was cancelled
    #[error("Cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Glossary could not be loaded
    #[error("Glossary error: {0}")]
    Glossary(#[from] LinkerError),

    /// Sink rejected a record
    #[error("Sink error: {0}")]
    Sink(String),
}

impl PipelineError {
    /// Short name of the error kind, used for batch tallies
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Encoding(_) => "encoding",
            PipelineError::Validation(_) => "validation",
            PipelineError::Join(_) => "join",
            PipelineError::Cancelled => "cancelled",
            PipelineError::Config(_) => "config",
            PipelineError::Glossary(_) => "glossary",
            PipelineError::Sink(_) => "sink",
        }
    }
}
