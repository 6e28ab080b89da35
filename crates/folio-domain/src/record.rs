//! The five-layer unified metadata record
//!
//! | Layer | Type | Populated by |
//! |-------|------|--------------|
//! | 1 | [`CoreIdentification`] | normalizer, path classification (required) |
//! | 2 | [`AuthorshipProvenance`] | author extractor, entity linker |
//! | 3 | [`TemporalClassification`] | date and classification extractors |
//! | 4 | [`TechnicalProcessing`] | structural analyzer, assembler timestamp |
//! | 5 | [`SemanticEnrichment`] | semantic extractor, entity linker |
//!
//! Records are immutable once assembled. A correction is made by turning
//! a record back into a [`RecordDraft`], editing the draft and assembling
//! again, which stamps a new processing timestamp.

use crate::{ContentFingerprint, IsoDate, LanguageCode, ProvenanceSource, SectionClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// HTML / XHTML
    Markup,
    /// PDF (text supplied by the fetch collaborator)
    Pdf,
    /// Plain text
    PlainText,
}

impl DocumentType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Markup => "markup",
            DocumentType::Pdf => "pdf",
            DocumentType::PlainText => "plain-text",
        }
    }

    /// Parse a type name, accepting the legacy `html` spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "markup" | "html" | "htm" | "xhtml" => Some(DocumentType::Markup),
            "pdf" => Some(DocumentType::Pdf),
            "plain-text" | "text" | "txt" | "markdown" => Some(DocumentType::PlainText),
            _ => None,
        }
    }

    /// Sniff the document type from content and locator
    ///
    /// Order: `%PDF` magic, locator extension, markup tags, plain text.
    pub fn sniff(bytes: &[u8], locator: &str) -> Self {
        if bytes.starts_with(b"%PDF") {
            return DocumentType::Pdf;
        }

        let last = crate::locator::path_segments(locator)
            .last()
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        if let Some((_, ext)) = last.rsplit_once('.') {
            match ext {
                "htm" | "html" | "xhtml" => return DocumentType::Markup,
                "pdf" => return DocumentType::Pdf,
                "txt" | "md" => return DocumentType::PlainText,
                _ => {}
            }
        }

        let head = &bytes[..bytes.len().min(4096)];
        let head = String::from_utf8_lossy(head).to_ascii_lowercase();
        if head.contains("<html") || head.contains("<body") || head.contains("<!doctype html") {
            DocumentType::Markup
        } else {
            DocumentType::PlainText
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid document type: {}", s))
    }
}

/// One step of a navigation trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Link text
    pub label: String,
    /// Resolved link target
    pub locator: String,
}

/// Insert into an ordered set, keeping first-seen order
///
/// Blank values are ignored. Returns whether the value was added.
pub fn push_unique(set: &mut Vec<String>, value: impl Into<String>) -> bool {
    let value = value.into();
    let value = value.trim();
    if value.is_empty() || set.iter().any(|v| v == value) {
        return false;
    }
    set.push(value.to_string());
    true
}

/// Layer 1: core identification (always fully populated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreIdentification {
    /// URL or path of the source document
    pub source_locator: String,

    /// Document title
    pub title: String,

    /// Fingerprint of the normalized content
    pub content_fingerprint: ContentFingerprint,

    /// Archive section
    pub section: SectionClass,

    /// ISO 639-1 language
    pub language: LanguageCode,

    /// Encoding the source bytes were in
    pub original_encoding: String,

    /// Whether normalization changed the bytes
    pub was_normalized: bool,
}

/// Layer 2: authorship and provenance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthorshipProvenance {
    /// Author names, canonical where resolvable
    pub authors: Vec<String>,

    /// Signal the authors came from
    pub author_source: Option<ProvenanceSource>,

    /// Confidence in the authors, [0.0, 1.0]
    pub author_confidence: f64,

    /// Transcribers named in the provenance block
    pub transcribers: Vec<String>,

    /// Organizations
    pub organizations: Vec<String>,

    /// Recipients of letters and addresses
    pub recipients: Vec<String>,

    /// Glossary identifiers of resolved authors
    pub canonical_author_ids: Vec<String>,
}

/// Layer 3: temporal and topical classification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemporalClassification {
    /// When the work was written
    pub written_date: Option<IsoDate>,

    /// When the work was first published
    pub published_date: Option<IsoDate>,

    /// Signal the dates came from
    pub date_source: Option<ProvenanceSource>,

    /// Confidence in the dates, [0.0, 1.0]
    pub date_confidence: f64,

    /// Free-text period label ("1860s", "1917-1923")
    pub time_period: Option<String>,

    /// Movement / affiliation tags
    pub movements: Vec<String>,

    /// Subject categories
    pub subject_categories: Vec<String>,
}

/// Layer 4 as produced by analysis, before the assembler stamps it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDraft {
    /// Kind of source document
    pub document_type: DocumentType,

    /// Size of the raw source in bytes
    pub byte_size: Option<u64>,

    /// Whitespace-delimited words in the extracted text
    pub word_count: Option<u64>,

    /// Characters in the extracted text
    pub character_count: Option<u64>,

    /// Heading counts keyed `h1`..`h6`
    pub heading_counts: BTreeMap<String, u64>,

    /// Table of contents detected
    pub has_table_of_contents: Option<bool>,

    /// Several independent works in one document
    pub is_anthology: Option<bool>,

    /// Content replaced by an external-storage pointer
    pub is_externally_stored: Option<bool>,

    /// Structural analysis fell back to defaults on malformed markup
    pub structure_degraded: Option<bool>,

    /// Version of the processor that produced the record
    pub processor_version: String,
}

impl TechnicalDraft {
    /// An all-unknown technical layer for the given document type
    pub fn unknown(document_type: DocumentType, processor_version: impl Into<String>) -> Self {
        Self {
            document_type,
            byte_size: None,
            word_count: None,
            character_count: None,
            heading_counts: BTreeMap::new(),
            has_table_of_contents: None,
            is_anthology: None,
            is_externally_stored: None,
            structure_degraded: None,
            processor_version: processor_version.into(),
        }
    }
}

/// Layer 4: technical processing metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalProcessing {
    /// Kind of source document
    pub document_type: DocumentType,

    /// Size of the raw source in bytes
    pub byte_size: Option<u64>,

    /// Whitespace-delimited words in the extracted text
    pub word_count: Option<u64>,

    /// Characters in the extracted text
    pub character_count: Option<u64>,

    /// Heading counts keyed `h1`..`h6`
    pub heading_counts: BTreeMap<String, u64>,

    /// Table of contents detected
    pub has_table_of_contents: Option<bool>,

    /// Several independent works in one document
    pub is_anthology: Option<bool>,

    /// Content replaced by an external-storage pointer
    pub is_externally_stored: Option<bool>,

    /// Structural analysis fell back to defaults on malformed markup
    pub structure_degraded: Option<bool>,

    /// Set once, when the record is assembled
    pub processing_timestamp: DateTime<Utc>,

    /// Version of the processor that produced the record
    pub processor_version: String,
}

impl TechnicalProcessing {
    /// Stamp a technical draft
    pub fn from_draft(draft: TechnicalDraft, processing_timestamp: DateTime<Utc>) -> Self {
        Self {
            document_type: draft.document_type,
            byte_size: draft.byte_size,
            word_count: draft.word_count,
            character_count: draft.character_count,
            heading_counts: draft.heading_counts,
            has_table_of_contents: draft.has_table_of_contents,
            is_anthology: draft.is_anthology,
            is_externally_stored: draft.is_externally_stored,
            structure_degraded: draft.structure_degraded,
            processing_timestamp,
            processor_version: draft.processor_version,
        }
    }

    /// Strip the timestamp again
    pub fn to_draft(&self) -> TechnicalDraft {
        TechnicalDraft {
            document_type: self.document_type,
            byte_size: self.byte_size,
            word_count: self.word_count,
            character_count: self.character_count,
            heading_counts: self.heading_counts.clone(),
            has_table_of_contents: self.has_table_of_contents,
            is_anthology: self.is_anthology,
            is_externally_stored: self.is_externally_stored,
            structure_degraded: self.structure_degraded,
            processor_version: self.processor_version.clone(),
        }
    }
}

/// Layer 5: semantic enrichment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticEnrichment {
    /// Keywords
    pub keywords: Vec<String>,

    /// Short description
    pub description: Option<String>,

    /// Locators of other documents this one links to
    pub cross_references: Vec<String>,

    /// Glossary entities linked from the document
    pub linked_entities: Vec<String>,

    /// Navigation trail
    pub breadcrumb: Vec<Breadcrumb>,

    /// Collection the work belongs to
    pub collection_id: Option<String>,

    /// Work identifier
    pub work_id: Option<String>,

    /// Chapter number, positive
    pub chapter_number: Option<u32>,

    /// Periodical the work first appeared in
    pub source_periodical: Option<String>,

    /// Issue date of that periodical
    pub issue_date: Option<IsoDate>,
}

/// Layer 1 before validation: every field may be missing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoreDraft {
    /// URL or path of the source document
    pub source_locator: Option<String>,
    /// Document title
    pub title: Option<String>,
    /// Hex fingerprint of the normalized content
    pub content_fingerprint: Option<String>,
    /// Archive section
    pub section: Option<SectionClass>,
    /// Language code as found
    pub language: Option<String>,
    /// Encoding the source bytes were in
    pub original_encoding: Option<String>,
    /// Whether normalization changed the bytes
    pub was_normalized: Option<bool>,
}

impl From<&CoreIdentification> for CoreDraft {
    fn from(core: &CoreIdentification) -> Self {
        Self {
            source_locator: Some(core.source_locator.clone()),
            title: Some(core.title.clone()),
            content_fingerprint: Some(core.content_fingerprint.to_string()),
            section: Some(core.section),
            language: Some(core.language.to_string()),
            original_encoding: Some(core.original_encoding.clone()),
            was_normalized: Some(core.was_normalized),
        }
    }
}

/// Everything the assembler needs to build a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Layer 1
    pub core: CoreDraft,
    /// Layer 2
    pub authorship: AuthorshipProvenance,
    /// Layer 3
    pub temporal: TemporalClassification,
    /// Layer 4 without timestamp
    pub technical: TechnicalDraft,
    /// Layer 5
    pub semantic: SemanticEnrichment,
}

/// Fully assembled five-layer record for one document
///
/// Fields are private: a record is only obtained from the assembler or by
/// decoding a stored record, and is never mutated afterwards. Serde goes
/// through the flat form, so deserializing applies the same domain checks
/// as [`crate::from_flat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "crate::flat::FlatRecord", into = "crate::flat::FlatRecord")]
pub struct UnifiedRecord {
    core: CoreIdentification,
    authorship: AuthorshipProvenance,
    temporal: TemporalClassification,
    technical: TechnicalProcessing,
    semantic: SemanticEnrichment,
}

impl UnifiedRecord {
    /// Compose a record from already-validated layers
    ///
    /// Intended for the assembler and the flat decoder; anything else
    /// should go through validation instead.
    pub fn from_layers(
        core: CoreIdentification,
        authorship: AuthorshipProvenance,
        temporal: TemporalClassification,
        technical: TechnicalProcessing,
        semantic: SemanticEnrichment,
    ) -> Self {
        Self {
            core,
            authorship,
            temporal,
            technical,
            semantic,
        }
    }

    /// Layer 1
    pub fn core(&self) -> &CoreIdentification {
        &self.core
    }

    /// Layer 2
    pub fn authorship(&self) -> &AuthorshipProvenance {
        &self.authorship
    }

    /// Layer 3
    pub fn temporal(&self) -> &TemporalClassification {
        &self.temporal
    }

    /// Layer 4
    pub fn technical(&self) -> &TechnicalProcessing {
        &self.technical
    }

    /// Layer 5
    pub fn semantic(&self) -> &SemanticEnrichment {
        &self.semantic
    }

    /// Source locator (record identity)
    pub fn locator(&self) -> &str {
        &self.core.source_locator
    }

    /// Start a correction: a draft carrying every current value
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            core: CoreDraft::from(&self.core),
            authorship: self.authorship.clone(),
            temporal: self.temporal.clone(),
            technical: self.technical.to_draft(),
            semantic: self.semantic.clone(),
        }
    }
}
