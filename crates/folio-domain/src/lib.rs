//! Folio Domain Layer
//!
//! This crate contains the metadata model shared by every stage of the
//! Folio extraction pipeline: the five-layer [`UnifiedRecord`], the value
//! objects its fields are built from, and its flat key/value codec.
//!
//! ## Key Concepts
//!
//! - **Unified record**: Five layers of metadata for one archive document
//! - **Provenance source**: Which signal produced an extracted value
//! - **Confidence**: A score in [0.0, 1.0] attached to each extraction
//! - **Section class**: Which part of the archive a document lives in
//! - **Content fingerprint**: Digest of the normalized content
//!
//! ## Architecture
//!
//! - Pure data and validation helpers only
//! - Extraction, linking, assembly and migration live in other crates
//! - Trait definitions for external interactions (record storage)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod date;
pub mod fingerprint;
pub mod flat;
pub mod language;
pub mod locator;
pub mod provenance;
pub mod record;
pub mod section;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use date::IsoDate;
pub use fingerprint::ContentFingerprint;
pub use flat::{from_flat, to_flat, FlatError, FlatRecord};
pub use language::LanguageCode;
pub use provenance::ProvenanceSource;
pub use record::{
    AuthorshipProvenance, Breadcrumb, CoreDraft, CoreIdentification, DocumentType, RecordDraft,
    SemanticEnrichment, TechnicalDraft, TechnicalProcessing, TemporalClassification,
    UnifiedRecord,
};
pub use section::SectionClass;
pub use traits::RecordSink;
