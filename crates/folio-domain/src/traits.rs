//! Trait definitions for external interactions
//!
//! Storage of assembled records belongs to an external collaborator.
//! The pipeline only hands it records that passed validation.

use crate::UnifiedRecord;

/// Trait for persisting assembled records
///
/// Implemented outside this workspace (columnar or document stores); an
/// in-memory implementation lives in `folio-pipeline`.
pub trait RecordSink {
    /// Error type for sink operations
    type Error;

    /// Persist one record
    fn persist(&mut self, record: &UnifiedRecord) -> Result<(), Self::Error>;
}
