//! Folio Extractor
//!
//! Turns raw archive documents into extracted metadata fields.
//!
//! # Overview
//!
//! Three stages run over every document, each reading the output of the
//! one before:
//!
//! ```text
//! bytes → EncodingNormalizer → ParsedDocument → StructuralAnalyzer
//!                                             → ExtractorSet (author, date,
//!                                               classification, semantic)
//! ```
//!
//! Every extracted value carries the [`folio_domain::ProvenanceSource`] it
//! came from and a confidence in `[0, 1]`. A signal that is missing is not
//! an error: the extractor returns an absent [`Extraction`] and the record
//! keeps the field empty.
//!
//! # Example Usage
//!
//! ```
//! use folio_extractor::{EncodingNormalizer, ExtractorSet, ParsedDocument, SourceContext};
//! use folio_domain::DocumentType;
//!
//! let locator = "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm";
//! let normalized = EncodingNormalizer::default()
//!     .normalize(b"<html><head><title>Commodities</title></head></html>", None)
//!     .unwrap();
//! let doc = ParsedDocument::parse(normalized.text, DocumentType::Markup, locator);
//! let findings = ExtractorSet::default().run(&doc, &SourceContext::from_locator(locator));
//!
//! assert_eq!(findings.semantic.chapter_number, Some(1));
//! ```

#![warn(missing_docs)]

mod config;
mod document;
mod encoding;
mod error;
pub mod extractors;
mod patterns;
mod structure;

#[cfg(test)]
mod tests;

pub use config::{ExtractorConfig, DEFAULT_BASE_URL};
pub use document::{
    archive_segments, canonical_locator, DateRange, Link, ManualOverride, ParsedDocument,
    ProvenanceLine, RawDocument, SourceContext,
};
pub use encoding::{declared_charset, plausibility, EncodingNormalizer, NormalizedText};
pub use error::ExtractorError;
pub use extractors::{
    AuthorExtractor, Classification, ClassificationExtractor, Contributors, DateExtractor, Dates,
    DocumentFindings, Extraction, ExtractorSet, FieldExtractor, SemanticExtractor,
    SemanticFindings, Taxonomy,
};
pub use structure::{is_externally_stored, StructuralAnalyzer, StructureReport};
