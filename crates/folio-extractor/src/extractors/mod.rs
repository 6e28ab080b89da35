//! Field extractors
//!
//! Each extractor reads the parsed document and its context and produces
//! one provenance-tagged value. Sources are consulted in a fixed priority
//! order and the first one that yields a value wins. Several values found
//! by the winning source are merged; values from lower-priority sources
//! are discarded, never combined.
//!
//! The set is closed: [`ExtractorSet`] owns one instance of each.

pub mod author;
pub mod classification;
pub mod date;
pub mod semantic;

use crate::config::ExtractorConfig;
use crate::document::{ParsedDocument, SourceContext};
use crate::patterns::LEADING_YEAR;
use folio_domain::record::push_unique;
use folio_domain::{Confidence, ProvenanceSource};
use tracing::debug;

pub use author::{AuthorExtractor, Contributors};
pub use classification::{Classification, ClassificationExtractor, Taxonomy};
pub use date::{DateExtractor, Dates};
pub use semantic::{SemanticExtractor, SemanticFindings};

/// A value with the signal it came from and how far to trust it
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    /// Extracted value, `None` when no signal was found
    pub value: Option<T>,

    /// Signal that produced the value
    pub source: Option<ProvenanceSource>,

    /// Reliability of the value
    pub confidence: Confidence,
}

impl<T> Extraction<T> {
    /// No signal found
    pub fn absent() -> Self {
        Self {
            value: None,
            source: None,
            confidence: Confidence::ZERO,
        }
    }

    /// Value found from a source
    pub fn found(value: T, source: ProvenanceSource, confidence: Confidence) -> Self {
        Self {
            value: Some(value),
            source: Some(source),
            confidence,
        }
    }

    /// Whether no signal was found
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self::absent()
    }
}

/// Common capability of all field extractors
pub trait FieldExtractor {
    /// Extracted value type
    type Output;

    /// Extract the field from a document
    fn extract(&self, doc: &ParsedDocument, ctx: &SourceContext) -> Extraction<Self::Output>;
}

/// Everything the extractors found in one document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentFindings {
    /// Authors
    pub authors: Extraction<Vec<String>>,
    /// Transcribers, recipients, organizations
    pub contributors: Contributors,
    /// Written / published dates
    pub dates: Extraction<Dates>,
    /// Categories, movements, period
    pub classification: Extraction<Classification>,
    /// Keywords
    pub keywords: Extraction<Vec<String>>,
    /// Remaining semantic fields
    pub semantic: SemanticFindings,
}

/// The closed set of field extractors
#[derive(Debug, Clone, Default)]
pub struct ExtractorSet {
    author: AuthorExtractor,
    date: DateExtractor,
    classification: ClassificationExtractor,
    semantic: SemanticExtractor,
}

impl ExtractorSet {
    /// Build the extractor set from configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            author: AuthorExtractor,
            date: DateExtractor,
            classification: ClassificationExtractor::new(config.taxonomy.clone()),
            semantic: SemanticExtractor::new(config.max_keywords, config.description_max_chars),
        }
    }

    /// Run every extractor against a document
    ///
    /// Extractors only read the document and context, so the order they
    /// run in does not affect the result.
    pub fn run(&self, doc: &ParsedDocument, ctx: &SourceContext) -> DocumentFindings {
        let authors = self.author.extract(doc, ctx);
        debug!(
            "Authors for {}: {:?} via {:?} ({})",
            ctx.locator, authors.value, authors.source, authors.confidence
        );
        let dates = self.date.extract(doc, ctx);
        debug!(
            "Dates for {}: {:?} via {:?} ({})",
            ctx.locator, dates.value, dates.source, dates.confidence
        );
        let classification = self.classification.extract(doc, ctx);
        let keywords = self.semantic.extract(doc, ctx);

        DocumentFindings {
            authors,
            contributors: self.author.contributors(doc),
            dates,
            classification,
            keywords,
            semantic: self.semantic.findings(doc, ctx),
        }
    }
}

/// Split a free-text name list on `;`, `,`, `&` and ` and `
///
/// Keeps first-seen order and drops duplicates and fragments without a
/// capital letter ("and others", "for MIA").
pub fn split_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for part in text.replace(" and ", ";").replace('&', ";").split([';', ',']) {
        let name = part.trim().trim_end_matches('.').trim();
        if name.chars().next().is_some_and(char::is_uppercase) {
            push_unique(&mut names, name);
        }
    }
    names
}

/// Year encoded in the archive path
///
/// The segment after `works` (`works/1867-c1`), else the first segment
/// that is a bare year.
pub fn path_year(ctx: &SourceContext) -> Option<i32> {
    let after_works = ctx
        .segment_index("works")
        .and_then(|idx| ctx.path_segments.get(idx + 1))
        .and_then(|seg| leading_year(seg));
    after_works.or_else(|| {
        ctx.path_segments
            .iter()
            .filter(|seg| seg.len() == 4)
            .find_map(|seg| leading_year(seg))
    })
}

fn leading_year(segment: &str) -> Option<i32> {
    LEADING_YEAR
        .captures(segment)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .filter(|y| (1500..=2100).contains(y))
}
