//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Missing signals are not errors: an extractor that finds nothing
/// returns an absent [`crate::Extraction`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Encoding could not be determined with enough confidence
    #[error("Encoding detection failed: confidence {confidence:.2} below threshold {threshold:.2}")]
    EncodingDetection {
        /// Plausibility score of the best candidate
        confidence: f64,
        /// Configured minimum
        threshold: f64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
