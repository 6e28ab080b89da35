//! End-to-end migration of legacy records

use folio_domain::{
    to_flat, DocumentType, IsoDate, ProvenanceSource, RecordDraft, RecordSink, SectionClass,
    SemanticEnrichment, UnifiedRecord,
};
use folio_migrator::{
    load_legacy_dir, LegacyFlatStrategy, LegacyRecord, MigrationError, MigrationStrategy,
    Migrator, MigratorConfig, Stage,
};
use proptest::prelude::*;
use std::fs;

#[derive(Default)]
struct VecSink(Vec<UnifiedRecord>);

impl RecordSink for VecSink {
    type Error = String;

    fn persist(&mut self, record: &UnifiedRecord) -> Result<(), String> {
        self.0.push(record.clone());
        Ok(())
    }
}

struct FailingSink;

impl RecordSink for FailingSink {
    type Error = String;

    fn persist(&mut self, _record: &UnifiedRecord) -> Result<(), String> {
        Err("store offline".to_string())
    }
}

fn capital() -> LegacyRecord {
    LegacyRecord::from_json(
        r#"{
            "source_url": "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm",
            "title": "Capital Volume One, Chapter One",
            "author": "Karl Marx",
            "date": "1867",
            "language": "en",
            "doc_type": "html",
            "original_path": "archive/marx/works/1867-c1/ch01.htm",
            "processed_date": "2024-03-01T12:00:00",
            "content_hash": "3f2a9c1b7d4e8f60",
            "word_count": 9821
        }"#,
    )
    .unwrap()
}

#[test]
fn test_invalid_legacy_language_still_migrates() {
    let mut legacy = capital();
    legacy.language = Some("english".to_string());
    let mut sink = VecSink::default();
    let record = Migrator::default_config().migrate_one(&legacy, &mut sink).unwrap();
    assert_eq!(record.core().language.as_str(), "en");
    assert_eq!(sink.0.len(), 1);
}

#[test]
fn test_legacy_author_and_date_are_tagged() {
    let mut sink = VecSink::default();
    let record = Migrator::default_config().migrate_one(&capital(), &mut sink).unwrap();

    assert_eq!(record.authorship().authors, vec!["Karl Marx"]);
    assert_eq!(record.authorship().author_source, Some(ProvenanceSource::LegacyMigrated));
    assert_eq!(record.authorship().author_confidence, 0.5);
    assert!(record.temporal().subject_categories.is_empty());
    assert_eq!(record.temporal().written_date, Some(IsoDate::Year(1867)));
    assert_eq!(record.temporal().date_source, Some(ProvenanceSource::LegacyMigrated));
    assert_eq!(record.temporal().date_confidence, 0.5);
    assert_eq!(sink.0, vec![record]);
}

#[test]
fn test_layer_one_matches_legacy_source() {
    let record = Migrator::default_config()
        .migrate_one(&capital(), &mut VecSink::default())
        .unwrap();
    let core = record.core();
    assert_eq!(core.source_locator, "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm");
    assert_eq!(core.title, "Capital Volume One, Chapter One");
    assert_eq!(core.content_fingerprint.as_str(), "3f2a9c1b7d4e8f60");
    assert!(core.content_fingerprint.is_legacy());
    assert_eq!(core.section, SectionClass::Archive);
    assert_eq!(core.language.as_str(), "en");
    assert_eq!(core.original_encoding, "unknown");
    assert_eq!(record.technical().document_type, DocumentType::Markup);
    assert_eq!(record.technical().word_count, Some(9821));
}

#[test]
fn test_underivable_fields_are_explicitly_absent() {
    let record = Migrator::default_config()
        .migrate_one(&capital(), &mut VecSink::default())
        .unwrap();
    assert!(record.authorship().canonical_author_ids.is_empty());
    assert!(record.temporal().published_date.is_none());
    assert!(record.temporal().time_period.is_none());
    assert!(record.technical().character_count.is_none());
    assert!(record.technical().has_table_of_contents.is_none());
    assert_eq!(record.semantic(), &SemanticEnrichment::default());

    let flat = to_flat(&record);
    assert_eq!(flat.get("semantic.description"), Some(&serde_json::Value::Null));
}

#[test]
fn test_failures_are_isolated_per_record() {
    let mut no_title = capital();
    no_title.title = None;
    let mut other = capital();
    other.source_url = Some("https://www.marxists.org/archive/lenin/works/1917/staterev/index.htm".to_string());
    other.content_hash = Some("0000111122223333".to_string());

    let mut sink = VecSink::default();
    let report = Migrator::default_config().migrate_batch(&[capital(), no_title, other], &mut sink);

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.resume_index, 3);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].stage, Stage::Preconditions);
    assert_eq!(sink.0.len(), 2);
}

#[test]
fn test_sink_failure_is_recorded_at_finalize() {
    let report = Migrator::default_config().migrate_batch(&[capital()], &mut FailingSink);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].stage, Stage::Finalize);
    assert!(report.failures[0].error.contains("store offline"));
}

struct TitleRewriter;

impl MigrationStrategy for TitleRewriter {
    fn prepare(&self, legacy: &LegacyRecord, config: &MigratorConfig) -> RecordDraft {
        let mut draft = LegacyFlatStrategy.prepare(legacy, config);
        draft.core.title = Some("Something else".to_string());
        draft
    }

    fn verify(&self, legacy: &LegacyRecord, record: &UnifiedRecord, config: &MigratorConfig) -> Result<(), String> {
        LegacyFlatStrategy.verify(legacy, record, config)
    }
}

#[test]
fn test_verification_rolls_back_lossy_strategy() {
    let migrator = Migrator::with_strategy(MigratorConfig::default(), TitleRewriter);
    let mut sink = VecSink::default();
    let err = migrator.migrate_one(&capital(), &mut sink).unwrap_err();
    assert!(matches!(err, MigrationError::Verification(ref msg) if msg.starts_with("title")));
    assert!(sink.0.is_empty());
}

#[test]
fn test_load_legacy_dir_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.json"), r#"{"title": "Second"}"#).unwrap();
    fs::write(dir.path().join("a.json"), r#"{"title": "First"}"#).unwrap();
    fs::write(dir.path().join("notes.md"), "# Not a record").unwrap();

    let load = load_legacy_dir(dir.path()).unwrap();
    assert!(load.failures.is_empty());
    let titles: Vec<_> = load.records.iter().filter_map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn test_bad_file_does_not_block_the_rest_of_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.json"), serde_json::to_string(&capital()).unwrap()).unwrap();
    fs::write(dir.path().join("broken.json"), "{").unwrap();
    fs::write(
        dir.path().join("c.json"),
        serde_json::to_string(&LegacyRecord {
            source_url: Some("https://www.marxists.org/archive/lenin/works/1917/staterev/index.htm".to_string()),
            title: Some("The State and Revolution".to_string()),
            content_hash: Some("0123456789abcdef".to_string()),
            ..LegacyRecord::default()
        })
        .unwrap(),
    )
    .unwrap();

    let load = load_legacy_dir(dir.path()).unwrap();
    assert_eq!(load.failures.len(), 1);
    assert!(load.failures[0].path.ends_with("broken.json"));
    assert!(matches!(&load.failures[0].error, MigrationError::Parse(msg) if msg.contains("broken.json")));

    let mut sink = VecSink::default();
    let report = Migrator::default_config().migrate_batch(&load.records, &mut sink);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(sink.0.len(), 2);
}

#[test]
fn test_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_legacy_dir(&dir.path().join("absent"));
    assert!(matches!(result, Err(MigrationError::Io(_))));
}

fn legacy_strategy() -> impl Strategy<Value = LegacyRecord> {
    (
        "[a-z]{1,12}",
        "[A-Za-z][A-Za-z ]{0,30}[A-Za-z]",
        "[0-9a-f]{16}",
        proptest::option::of("[A-Z][a-z]{2,10} [A-Z][a-z]{2,10}"),
        proptest::option::of(1800i32..2000),
        proptest::option::of(0u64..1_000_000),
    )
        .prop_map(|(slug, title, hash, author, year, word_count)| LegacyRecord {
            source_url: Some(format!("https://www.marxists.org/archive/{}/index.htm", slug)),
            title: Some(title),
            content_hash: Some(hash),
            author,
            date: year.map(|y| y.to_string()),
            word_count,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn prop_migration_does_not_lose_layer_one(legacy in legacy_strategy()) {
        let record = Migrator::default_config()
            .migrate_one(&legacy, &mut VecSink::default())
            .unwrap();
        prop_assert_eq!(Some(record.core().source_locator.clone()), legacy.source_url.clone());
        prop_assert_eq!(Some(record.core().title.clone()), legacy.title.clone());
        prop_assert_eq!(Some(record.core().content_fingerprint.to_string()), legacy.content_hash.clone());
        prop_assert_eq!(record.technical().word_count, legacy.word_count);
        prop_assert_eq!(record.authorship().author_source.is_some(), legacy.author.is_some());
    }

    #[test]
    fn prop_resumed_batches_cover_every_record(
        records in proptest::collection::vec(legacy_strategy(), 0..12),
        limit in 1usize..5,
    ) {
        let migrator = Migrator::new(MigratorConfig { batch_limit: Some(limit), ..MigratorConfig::default() });
        let mut sink = VecSink::default();
        let mut start = 0;
        let mut calls = 0;
        loop {
            let report = migrator.migrate_batch_from(&records, start, &mut sink);
            prop_assert_eq!(report.failed, 0);
            start = report.resume_index;
            calls += 1;
            if report.is_complete(records.len()) {
                break;
            }
        }
        prop_assert_eq!(sink.0.len(), records.len());
        prop_assert!(calls <= records.len() / limit + 1);
    }
}
