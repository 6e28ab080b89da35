//! Per-variant migration stages
//!
//! The migrator runs the same fixed sequence for every record. What a
//! strategy supplies is how a legacy record becomes a draft and how the
//! assembled record is checked against its source.

use crate::legacy::present;
use crate::{LegacyRecord, MigratorConfig};
use folio_domain::record::push_unique;
use folio_domain::{
    AuthorshipProvenance, CoreDraft, DocumentType, IsoDate, LanguageCode, ProvenanceSource,
    RecordDraft, SectionClass, SemanticEnrichment, TechnicalDraft, TemporalClassification,
    UnifiedRecord,
};
use tracing::warn;

/// Encoding recorded for migrated records
pub const UNKNOWN_ENCODING: &str = "unknown";

/// Prepare and verify stages for one legacy record shape
pub trait MigrationStrategy: Send + Sync {
    /// Build a draft from a legacy record whose required fields are present
    fn prepare(&self, legacy: &LegacyRecord, config: &MigratorConfig) -> RecordDraft;

    /// Check that an assembled record carries the legacy values
    ///
    /// # Errors
    /// Returns a description of the first mismatch
    fn verify(
        &self,
        legacy: &LegacyRecord,
        record: &UnifiedRecord,
        config: &MigratorConfig,
    ) -> Result<(), String>;
}

/// Strategy for the flat eight-field record of the previous processor
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFlatStrategy;

impl LegacyFlatStrategy {
    fn date(legacy: &LegacyRecord) -> Option<IsoDate> {
        present(&legacy.date).and_then(IsoDate::parse_loose)
    }

    /// Legacy language if it names a valid code, else the configured default
    fn language(legacy: &LegacyRecord, config: &MigratorConfig) -> String {
        match present(&legacy.language).map(LanguageCode::new) {
            Some(Ok(code)) => code.as_str().to_string(),
            Some(Err(e)) => {
                warn!(
                    "{}: {}; using '{}'",
                    present(&legacy.source_url).unwrap_or("<no locator>"),
                    e,
                    config.default_language
                );
                config.default_language.clone()
            }
            None => config.default_language.clone(),
        }
    }
}

impl MigrationStrategy for LegacyFlatStrategy {
    fn prepare(&self, legacy: &LegacyRecord, config: &MigratorConfig) -> RecordDraft {
        let locator = present(&legacy.source_url).unwrap_or_default();
        let section = SectionClass::from_locator(locator).unwrap_or(SectionClass::Archive);

        let core = CoreDraft {
            source_locator: Some(locator.to_string()),
            title: present(&legacy.title).map(str::to_string),
            content_fingerprint: present(&legacy.content_hash).map(str::to_ascii_lowercase),
            section: Some(section),
            language: Some(Self::language(legacy, config)),
            original_encoding: Some(UNKNOWN_ENCODING.to_string()),
            was_normalized: Some(false),
        };

        let mut authorship = AuthorshipProvenance::default();
        if let Some(author) = legacy.known_author() {
            push_unique(&mut authorship.authors, author);
            authorship.author_source = Some(ProvenanceSource::LegacyMigrated);
            authorship.author_confidence = config.legacy_confidence;
        }

        let mut temporal = TemporalClassification::default();
        if let Some(date) = Self::date(legacy) {
            temporal.written_date = Some(date);
            temporal.date_source = Some(ProvenanceSource::LegacyMigrated);
            temporal.date_confidence = config.legacy_confidence;
        }

        let document_type = present(&legacy.doc_type)
            .and_then(DocumentType::parse)
            .unwrap_or_else(|| DocumentType::sniff(&[], locator));
        let mut technical = TechnicalDraft::unknown(document_type, config.processor_version.clone());
        technical.word_count = legacy.word_count;

        RecordDraft {
            core,
            authorship,
            temporal,
            technical,
            semantic: SemanticEnrichment::default(),
        }
    }

    fn verify(
        &self,
        legacy: &LegacyRecord,
        record: &UnifiedRecord,
        config: &MigratorConfig,
    ) -> Result<(), String> {
        let core = record.core();
        let expected_language = LanguageCode::new(&Self::language(legacy, config))?;
        let expected_authors: Vec<String> = legacy.known_author().map(str::to_string).into_iter().collect();

        let checks = [
            ("source_locator", present(&legacy.source_url) == Some(core.source_locator.as_str())),
            ("title", present(&legacy.title) == Some(core.title.as_str())),
            (
                "content_fingerprint",
                present(&legacy.content_hash).map(str::to_ascii_lowercase).as_deref()
                    == Some(core.content_fingerprint.as_str()),
            ),
            ("language", expected_language == core.language),
            ("authors", record.authorship().authors == expected_authors),
            ("written_date", record.temporal().written_date == Self::date(legacy)),
            ("word_count", record.technical().word_count == legacy.word_count),
        ];

        match checks.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(format!("{} differs from the legacy record", field)),
            None => Ok(()),
        }
    }
}
