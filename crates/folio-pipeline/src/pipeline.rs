//! Single-document processing

use crate::{PipelineConfig, PipelineError};
use folio_domain::record::push_unique;
use folio_domain::{
    AuthorshipProvenance, ContentFingerprint, CoreDraft, RecordDraft, SectionClass,
    SemanticEnrichment, TechnicalDraft, TemporalClassification, UnifiedRecord,
};
use folio_extractor::{
    canonical_locator, is_externally_stored, DateRange, DocumentFindings, EncodingNormalizer,
    ExtractorSet, ManualOverride, ParsedDocument, RawDocument, SourceContext, StructuralAnalyzer,
    StructureReport,
};
use folio_gatekeeper::Gatekeeper;
use folio_linker::{EntityLinker, Glossary};
use folio_migrator::Migrator;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Processor version stamped on every record this pipeline assembles
pub const PROCESSOR_VERSION: &str = concat!("folio-pipeline/", env!("CARGO_PKG_VERSION"));

/// One document to process
#[derive(Debug, Clone)]
pub struct DocumentJob {
    /// Bytes and locator as fetched
    pub raw: RawDocument,

    /// Curated values for this document
    pub manual: Option<ManualOverride>,

    /// Dates of the surrounding documents
    pub neighbour_dates: Option<DateRange>,
}

impl DocumentJob {
    /// A job with no curated values or neighbours
    pub fn new(raw: RawDocument) -> Self {
        Self {
            raw,
            manual: None,
            neighbour_dates: None,
        }
    }

    /// Attach curated values
    pub fn with_manual(mut self, manual: ManualOverride) -> Self {
        self.manual = Some(manual);
        self
    }

    /// Attach the neighbouring date range
    pub fn with_neighbour_dates(mut self, range: DateRange) -> Self {
        self.neighbour_dates = Some(range);
        self
    }
}

/// The extraction pipeline for one document at a time
///
/// Holds only read-only state, so one instance is shared by every worker
/// behind an `Arc`.
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: EncodingNormalizer,
    analyzer: StructuralAnalyzer,
    extractors: ExtractorSet,
    linker: EntityLinker,
    gatekeeper: Gatekeeper,
    known_authors: Arc<BTreeMap<String, String>>,
}

impl Pipeline {
    /// Build a pipeline over a loaded glossary
    ///
    /// # Errors
    /// [`PipelineError::Config`] when the configuration does not validate
    pub fn new(config: PipelineConfig, glossary: Arc<Glossary>) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let known_authors = Arc::new(glossary.known_slugs());
        Ok(Self {
            normalizer: EncodingNormalizer::new(config.extractor.min_detection_confidence),
            analyzer: StructuralAnalyzer::from_config(&config.extractor),
            extractors: ExtractorSet::new(&config.extractor),
            linker: EntityLinker::new(glossary, config.linker.clone()),
            gatekeeper: Gatekeeper::new(config.gatekeeper.clone()),
            known_authors,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Migrator for legacy records, configured from the `migrator` section
    pub fn migrator(&self) -> Migrator {
        Migrator::new(self.config.migrator.clone())
    }

    /// Process one document into a validated record
    pub fn process(&self, job: DocumentJob) -> Result<UnifiedRecord, PipelineError> {
        let draft = self.draft(job)?;
        Ok(self.gatekeeper.assemble(draft)?)
    }

    /// Run every stage except assembly
    ///
    /// # Errors
    /// Only normalization can fail; missing signals leave fields empty.
    pub fn draft(&self, job: DocumentJob) -> Result<RecordDraft, PipelineError> {
        let DocumentJob {
            raw,
            manual,
            neighbour_dates,
        } = job;
        let locator = canonical_locator(&raw.locator, &self.config.extractor.base_url);
        let document_type = raw.document_type();
        let byte_size = raw.bytes.len() as u64;

        let normalized = self
            .normalizer
            .normalize(&raw.bytes, raw.encoding_hint.as_deref())?;
        let fingerprint = ContentFingerprint::of(normalized.text.as_bytes());
        let original_encoding = normalized.original_encoding;
        let was_normalized = normalized.was_normalized;

        let doc = ParsedDocument::parse(normalized.text, document_type, &locator);
        let structure = self.analyzer.analyze_document(&doc);

        let mut ctx = SourceContext::from_locator(locator.clone())
            .with_known_authors(Arc::clone(&self.known_authors));
        if let Some(manual) = manual {
            ctx = ctx.with_manual(manual);
        }
        if let Some(range) = neighbour_dates {
            ctx = ctx.with_neighbour_dates(range);
        }

        let findings = self.extractors.run(&doc, &ctx);
        let section = ctx.section().unwrap_or_else(|| {
            debug!("No section in {}, assuming archive", locator);
            SectionClass::Archive
        });

        let core = CoreDraft {
            source_locator: Some(locator.clone()),
            title: doc.derive_title(&locator),
            content_fingerprint: Some(fingerprint.to_string()),
            section: Some(section),
            language: Some(doc.derive_language(&ctx).to_string()),
            original_encoding: Some(original_encoding),
            was_normalized: Some(was_normalized),
        };

        let technical = TechnicalDraft {
            byte_size: Some(byte_size),
            word_count: Some(doc.body_text.split_whitespace().count() as u64),
            character_count: Some(doc.body_text.chars().count() as u64),
            ..technical_layer(&doc, structure)
        };

        let DocumentFindings {
            authors,
            contributors,
            dates,
            classification,
            keywords,
            semantic,
        } = findings;

        let mut authorship = AuthorshipProvenance {
            author_source: authors.source,
            author_confidence: authors.confidence.value(),
            transcribers: contributors.transcribers,
            recipients: contributors.recipients,
            ..AuthorshipProvenance::default()
        };
        for name in authors.value.unwrap_or_default() {
            match self.linker.link(&name).canonical_id().and_then(|id| self.linker.glossary().get(id)) {
                Some(entry) => {
                    push_unique(&mut authorship.authors, entry.name.clone());
                    push_unique(&mut authorship.canonical_author_ids, entry.id.clone());
                }
                None => {
                    push_unique(&mut authorship.authors, name);
                }
            }
        }

        let mut linked_entities = semantic.linked_entities;
        for name in contributors.organizations {
            match self.linker.link(&name).canonical_id().and_then(|id| self.linker.glossary().get(id)) {
                Some(entry) => {
                    push_unique(&mut authorship.organizations, entry.name.clone());
                    push_unique(&mut linked_entities, entry.id.clone());
                }
                None => {
                    push_unique(&mut authorship.organizations, name);
                }
            }
        }

        let dates_value = dates.value.unwrap_or_default();
        let classification = classification.value.unwrap_or_default();
        let temporal = TemporalClassification {
            written_date: dates_value.written,
            published_date: dates_value.published,
            date_source: dates.source,
            date_confidence: dates.confidence.value(),
            time_period: classification.time_period,
            movements: classification.movements,
            subject_categories: classification.subject_categories,
        };

        let semantic = SemanticEnrichment {
            keywords: keywords.value.unwrap_or_default(),
            description: semantic.description,
            cross_references: semantic.cross_references,
            linked_entities,
            breadcrumb: semantic.breadcrumb,
            collection_id: semantic.collection_id,
            work_id: semantic.work_id,
            chapter_number: semantic.chapter_number,
            source_periodical: semantic.source_periodical,
            issue_date: semantic.issue_date,
        };

        debug!(
            "Drafted {}: {} author(s), {} canonical",
            locator,
            authorship.authors.len(),
            authorship.canonical_author_ids.len()
        );
        Ok(RecordDraft {
            core,
            authorship,
            temporal,
            technical,
            semantic,
        })
    }
}

fn technical_layer(doc: &ParsedDocument, structure: Option<StructureReport>) -> TechnicalDraft {
    let mut technical = TechnicalDraft::unknown(doc.document_type, PROCESSOR_VERSION);
    match structure {
        Some(report) => {
            technical.heading_counts = report.heading_counts;
            technical.has_table_of_contents = Some(report.has_table_of_contents);
            technical.is_anthology = Some(report.is_anthology);
            technical.is_externally_stored = Some(report.is_externally_stored);
            technical.structure_degraded = Some(report.degraded);
        }
        None => {
            technical.is_externally_stored = Some(is_externally_stored(&doc.text));
        }
    }
    technical
}
