//! Schema Assembler: record validation and assembly

use crate::config::GatekeeperConfig;
use crate::error::{GatekeeperError, SchemaValidationError};
use crate::rules::{Rule, Violation};
use chrono::{DateTime, Utc};
use folio_domain::confidence::is_unit_interval;
use folio_domain::traits::RecordSink;
use folio_domain::{
    fingerprint, locator, ContentFingerprint, CoreDraft, CoreIdentification, LanguageCode,
    ProvenanceSource, RecordDraft, TechnicalProcessing, UnifiedRecord,
};
use tracing::{debug, warn};

/// Inferred dates may not claim more confidence than this
pub const MAX_INFERRED_CONFIDENCE: f64 = 0.5;

const REQUIRED: &str = "required field missing";

/// The Gatekeeper validates drafts and assembles immutable records
pub struct Gatekeeper {
    config: GatekeeperConfig,
    rules: Rule<RecordDraft>,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: GatekeeperConfig) -> Self {
        let rules = record_rules(&config);
        Self { config, rules }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(GatekeeperConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Every violation in a draft, required fields first
    pub fn validate(&self, draft: &RecordDraft) -> Vec<Violation> {
        self.rules.evaluate(draft)
    }

    /// Validate a draft and assemble the record, stamped now
    pub fn assemble(&self, draft: RecordDraft) -> Result<UnifiedRecord, SchemaValidationError> {
        self.assemble_at(draft, Utc::now())
    }

    /// Validate a draft and assemble the record with a given timestamp
    ///
    /// # Errors
    /// [`SchemaValidationError`] listing every violation; nothing is built
    pub fn assemble_at(
        &self,
        draft: RecordDraft,
        processing_timestamp: DateTime<Utc>,
    ) -> Result<UnifiedRecord, SchemaValidationError> {
        let locator = draft.core.source_locator.clone();
        let violations = self.validate(&draft);
        if !violations.is_empty() {
            warn!(
                "Rejected {}: {} violation(s)",
                locator.as_deref().unwrap_or("<no locator>"),
                violations.len()
            );
            return Err(SchemaValidationError {
                locator,
                violations,
            });
        }

        let RecordDraft {
            core,
            authorship,
            temporal,
            technical,
            semantic,
        } = draft;

        let core = into_core(core).ok_or_else(|| SchemaValidationError {
            locator: locator.clone(),
            violations: vec![Violation::new("core", "could not be assembled")],
        })?;

        debug!("Assembled record for {}", core.source_locator);
        Ok(UnifiedRecord::from_layers(
            core,
            authorship,
            temporal,
            TechnicalProcessing::from_draft(technical, processing_timestamp),
            semantic,
        ))
    }

    /// Assemble a record and hand it to a sink
    ///
    /// Nothing reaches the sink when validation fails.
    pub fn assemble_into<S>(&self, draft: RecordDraft, sink: &mut S) -> Result<UnifiedRecord, GatekeeperError>
    where
        S: RecordSink,
        S::Error: std::fmt::Display,
    {
        let record = self.assemble(draft)?;
        sink.persist(&record)
            .map_err(|e| GatekeeperError::Sink(e.to_string()))?;
        Ok(record)
    }
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::default_config()
    }
}

fn into_core(core: CoreDraft) -> Option<CoreIdentification> {
    Some(CoreIdentification {
        source_locator: core.source_locator?,
        title: core.title?,
        content_fingerprint: ContentFingerprint::from_hex(&core.content_fingerprint?).ok()?,
        section: core.section?,
        language: LanguageCode::new(&core.language?).ok()?,
        original_encoding: core.original_encoding?,
        was_normalized: core.was_normalized?,
    })
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn required(field: &'static str, get: fn(&CoreDraft) -> bool) -> Rule<RecordDraft> {
    Rule::check(field, REQUIRED, move |d: &RecordDraft| get(&d.core))
}

/// The record rule set
///
/// Presence of every layer-1 field is checked first, then formats and
/// cross-field consistency. A check on an absent optional value passes.
pub fn record_rules(config: &GatekeeperConfig) -> Rule<RecordDraft> {
    let mut rules = vec![
        required("source_locator", |c| present(&c.source_locator)),
        required("title", |c| present(&c.title)),
        required("content_fingerprint", |c| present(&c.content_fingerprint)),
        required("section", |c| c.section.is_some()),
        required("language", |c| present(&c.language)),
        required("original_encoding", |c| present(&c.original_encoding)),
        required("was_normalized", |c| c.was_normalized.is_some()),
        Rule::check("source_locator", "malformed locator", |d: &RecordDraft| {
            d.core.source_locator.as_deref().is_none_or(locator::is_well_formed)
        }),
        Rule::check("content_fingerprint", "malformed fingerprint", |d: &RecordDraft| {
            d.core.content_fingerprint.as_deref().is_none_or(fingerprint::is_well_formed)
        }),
        Rule::check("language", "not an ISO 639-1 code", |d: &RecordDraft| {
            d.core.language.as_deref().is_none_or(|l| LanguageCode::new(l).is_ok())
        }),
        Rule::check("author_confidence", "outside [0, 1]", |d: &RecordDraft| {
            is_unit_interval(d.authorship.author_confidence)
        }),
        Rule::check("author_source", "required when authors are present", |d: &RecordDraft| {
            d.authorship.authors.is_empty() || d.authorship.author_source.is_some()
        }),
        Rule::check(
            "canonical_author_ids",
            "only allowed when authors are present",
            |d: &RecordDraft| d.authorship.canonical_author_ids.is_empty() || !d.authorship.authors.is_empty(),
        ),
        Rule::check("date_confidence", "outside [0, 1]", |d: &RecordDraft| {
            is_unit_interval(d.temporal.date_confidence)
        }),
        Rule::check("date_source", "required when a date is present", |d: &RecordDraft| {
            let t = &d.temporal;
            (t.written_date.is_none() && t.published_date.is_none()) || t.date_source.is_some()
        }),
        Rule::not(
            "date_confidence",
            "inferred dates may not exceed 0.5",
            Rule::check("date_confidence", "inferred above ceiling", |d: &RecordDraft| {
                d.temporal.date_source == Some(ProvenanceSource::Inferred)
                    && d.temporal.date_confidence > MAX_INFERRED_CONFIDENCE
            }),
        ),
        Rule::check("chapter_number", "must be positive", |d: &RecordDraft| {
            d.semantic.chapter_number.is_none_or(|n| n > 0)
        }),
    ];

    if !config.allow_legacy_fingerprint {
        rules.push(Rule::check(
            "content_fingerprint",
            "legacy fingerprint not allowed",
            |d: &RecordDraft| {
                d.core
                    .content_fingerprint
                    .as_deref()
                    .is_none_or(|f| f.len() != fingerprint::LEGACY_LEN)
            },
        ));
    }

    if config.validate_link_locators {
        rules.push(Rule::check("cross_references", "malformed locator", |d: &RecordDraft| {
            d.semantic
                .cross_references
                .iter()
                .all(|l| locator::is_well_formed(l))
        }));
        rules.push(Rule::check("breadcrumb", "malformed locator", |d: &RecordDraft| {
            d.semantic
                .breadcrumb
                .iter()
                .all(|b| locator::is_well_formed(&b.locator))
        }));
    }

    if config.validate_text_counts {
        rules.push(Rule::check("word_count", "exceeds character_count", |d: &RecordDraft| {
            match (d.technical.word_count, d.technical.character_count) {
                (Some(words), Some(chars)) => words <= chars,
                _ => true,
            }
        }));
    }

    Rule::all(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use folio_domain::{
        AuthorshipProvenance, DocumentType, IsoDate, SectionClass, SemanticEnrichment,
        TechnicalDraft, TemporalClassification,
    };

    fn draft() -> RecordDraft {
        RecordDraft {
            core: CoreDraft {
                source_locator: Some("https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm".to_string()),
                title: Some("Capital Vol. I, Chapter 1: Commodities".to_string()),
                content_fingerprint: Some(ContentFingerprint::of(b"capital").to_string()),
                section: Some(SectionClass::Archive),
                language: Some("en".to_string()),
                original_encoding: Some("UTF-8".to_string()),
                was_normalized: Some(false),
            },
            authorship: AuthorshipProvenance {
                authors: vec!["Karl Marx".to_string()],
                author_source: Some(ProvenanceSource::Path),
                author_confidence: 1.0,
                ..Default::default()
            },
            temporal: TemporalClassification {
                written_date: Some(IsoDate::Year(1867)),
                date_source: Some(ProvenanceSource::Path),
                date_confidence: 1.0,
                ..Default::default()
            },
            technical: TechnicalDraft::unknown(DocumentType::Markup, "0.1.0"),
            semantic: SemanticEnrichment {
                chapter_number: Some(1),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_valid_draft_assembles() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = Gatekeeper::default().assemble_at(draft(), ts).unwrap();
        assert_eq!(record.core().title, "Capital Vol. I, Chapter 1: Commodities");
        assert_eq!(record.technical().processing_timestamp, ts);
        assert_eq!(record.authorship().authors, vec!["Karl Marx"]);
    }

    #[test]
    fn test_missing_title() {
        let mut d = draft();
        d.core.title = None;
        let err = Gatekeeper::default().assemble(d).unwrap_err();
        assert_eq!(err.messages(), vec!["title: required field missing"]);
        assert_eq!(
            err.locator.as_deref(),
            Some("https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm")
        );
    }

    #[test]
    fn test_blank_title_counts_as_missing() {
        let mut d = draft();
        d.core.title = Some("   ".to_string());
        let err = Gatekeeper::default().assemble(d).unwrap_err();
        assert!(err.has_violation("title"));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut d = draft();
        d.core.title = None;
        d.core.language = Some("english".to_string());
        d.authorship.author_confidence = 1.5;
        d.authorship.author_source = None;
        d.semantic.chapter_number = Some(0);
        let err = Gatekeeper::default().assemble(d).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "title: required field missing",
                "language: not an ISO 639-1 code",
                "author_confidence: outside [0, 1]",
                "author_source: required when authors are present",
                "chapter_number: must be positive",
            ]
        );
    }

    #[test]
    fn test_inferred_date_ceiling() {
        let mut d = draft();
        d.temporal.date_source = Some(ProvenanceSource::Inferred);
        d.temporal.date_confidence = 0.7;
        let err = Gatekeeper::default().assemble(d).unwrap_err();
        assert_eq!(err.messages(), vec!["date_confidence: inferred dates may not exceed 0.5"]);

        let mut d = draft();
        d.temporal.date_source = Some(ProvenanceSource::Inferred);
        d.temporal.date_confidence = 0.5;
        assert!(Gatekeeper::default().assemble(d).is_ok());
    }

    #[test]
    fn test_legacy_fingerprint_toggle() {
        let mut d = draft();
        d.core.content_fingerprint = Some("0123456789abcdef".to_string());
        assert!(Gatekeeper::default().assemble(d.clone()).is_err());
        assert!(Gatekeeper::new(GatekeeperConfig::migration()).assemble(d).is_ok());
    }

    #[test]
    fn test_canonical_ids_need_authors() {
        let mut d = draft();
        d.authorship.authors.clear();
        d.authorship.canonical_author_ids = vec!["marx-karl-1818".to_string()];
        let err = Gatekeeper::default().assemble(d).unwrap_err();
        assert!(err.has_violation("canonical_author_ids"));
    }

    #[test]
    fn test_text_counts_and_links() {
        let mut d = draft();
        d.technical.word_count = Some(10);
        d.technical.character_count = Some(5);
        d.semantic.cross_references = vec!["not a locator".to_string()];
        let violations = Gatekeeper::default().validate(&d);
        assert_eq!(violations.len(), 2);

        assert!(Gatekeeper::new(GatekeeperConfig::permissive()).validate(&d).is_empty());
    }
}
