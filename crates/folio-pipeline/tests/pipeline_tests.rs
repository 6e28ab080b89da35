//! End-to-end pipeline and worker tests

use folio_domain::{from_flat, FlatRecord, IsoDate, ProvenanceSource, RecordSink, SectionClass, UnifiedRecord};
use folio_extractor::RawDocument;
use folio_linker::{EntityKind, Glossary, GlossaryEntry};
use folio_pipeline::{
    load_glossary, pipeline_from_config, DocumentJob, FlatJsonSink, InMemorySink, Pipeline,
    PipelineConfig, PipelineError, PipelineWorker,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CAPITAL_CH01: &str = r#"<html lang="en"><head>
<meta charset="utf-8">
<title>Capital Vol. I, Chapter 1: Commodities</title>
</head><body>
<h1>Chapter 1: Commodities</h1>
<p class="information"><span class="info">Written:</span> 1867;<br>
<span class="info">Source:</span> <em>Capital</em> Volume I, Progress Publishers</p>
<p>The wealth of those societies in which the capitalist mode of production prevails, presents itself as an immense accumulation of commodities.</p>
</body></html>"#;

const CAPITAL_LOCATOR: &str = "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn glossary() -> Arc<Glossary> {
    Arc::new(
        Glossary::new(vec![
            GlossaryEntry::new("marx-karl-1818", "Karl Marx", EntityKind::Person).with_slug("marx"),
            GlossaryEntry::new("lenin-vladimir-1870", "V. I. Lenin", EntityKind::Person)
                .with_variant("Vladimir Lenin")
                .with_slug("lenin"),
        ])
        .unwrap(),
    )
}

fn pipeline() -> Arc<Pipeline> {
    Arc::new(Pipeline::new(PipelineConfig::default(), glossary()).unwrap())
}

fn titled(n: usize) -> DocumentJob {
    let html = format!(
        "<html><head><title>Article {}</title></head><body><p>Body of article number {}.</p></body></html>",
        n, n
    );
    DocumentJob::new(RawDocument::new(
        html.into_bytes(),
        format!("/archive/lenin/works/1917/art{:02}.htm", n),
    ))
}

fn untitled() -> DocumentJob {
    DocumentJob::new(RawDocument::new(
        b"<html><body><p>No title anywhere.</p></body></html>".to_vec(),
        "/archive/lenin/works/1917/untitled.htm",
    ))
}

#[test]
fn test_utf8_document_end_to_end() {
    init_tracing();
    let record = pipeline()
        .process(DocumentJob::new(RawDocument::new(CAPITAL_CH01.as_bytes(), CAPITAL_LOCATOR)))
        .unwrap();

    let core = record.core();
    assert_eq!(core.title, "Capital Vol. I, Chapter 1: Commodities");
    assert_eq!(core.section, SectionClass::Archive);
    assert_eq!(core.language.as_str(), "en");
    assert_eq!(core.original_encoding, "UTF-8");
    assert!(!core.was_normalized);
    assert_eq!(core.content_fingerprint.as_str().len(), 64);

    assert_eq!(record.authorship().authors, vec!["Karl Marx"]);
    assert_eq!(record.authorship().author_source, Some(ProvenanceSource::Path));
    assert_eq!(record.authorship().author_confidence, 1.0);
    assert_eq!(record.authorship().canonical_author_ids, vec!["marx-karl-1818"]);

    assert_eq!(record.temporal().written_date, Some(IsoDate::Year(1867)));
    assert_eq!(record.semantic().chapter_number, Some(1));
    assert_eq!(record.technical().heading_counts["h1"], 1);
}

#[test]
fn test_latin1_document_is_normalized() {
    let mut bytes = b"<html><head><title>Das Kapital</title></head><body><p>".to_vec();
    bytes.extend_from_slice(&[0x47, 0x65, 0x62, 0x72, 0xE4, 0x75, 0x63, 0x68, 0x73, 0x77, 0x65, 0x72, 0x74]);
    bytes.extend_from_slice(b"</p></body></html>");
    let latin1 = RawDocument::new(bytes, "/archive/marx/works/1867-c1/ch01.htm").with_encoding_hint("iso-8859-1");

    let record = pipeline().process(DocumentJob::new(latin1)).unwrap();
    assert!(record.core().was_normalized);
    assert_eq!(record.core().original_encoding, "ISO-8859-1");

    let utf8 = RawDocument::new(
        "<html><head><title>Das Kapital</title></head><body><p>Gebräuchswert</p></body></html>".as_bytes(),
        "/archive/marx/works/1867-c1/ch01.htm",
    );
    let same_text = pipeline().process(DocumentJob::new(utf8)).unwrap();
    assert_eq!(record.core().content_fingerprint, same_text.core().content_fingerprint);
}

#[test]
fn test_links_with_spaces_do_not_reject_document() {
    let html = r#"<html><head><title>Letters</title></head><body>
<p class="breadcrumb"><a href="../../../index.htm">Marx/Engels</a> &gt; <a href="../index 1868.htm">1868</a></p>
<p>Letters written during the year.</p>
<p><a href="letters/68 01 08.htm">Marx to Engels, 8 January</a></p>
</body></html>"#;
    let record = pipeline()
        .process(DocumentJob::new(RawDocument::new(
            html.as_bytes(),
            "https://www.marxists.org/archive/marx/works/1868/index.htm",
        )))
        .unwrap();

    assert!(record
        .semantic()
        .cross_references
        .contains(&"https://www.marxists.org/archive/marx/works/1868/letters/68%2001%2008.htm".to_string()));
    let crumbs: Vec<&str> = record.semantic().breadcrumb.iter().map(|b| b.locator.as_str()).collect();
    assert!(crumbs.contains(&"https://www.marxists.org/archive/marx/works/index%201868.htm"));
}

#[test]
fn test_missing_title_is_validation_error() {
    match pipeline().process(untitled()) {
        Err(PipelineError::Validation(err)) => {
            assert!(err.messages().contains(&"title: required field missing".to_string()));
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.locator().to_string())),
    }
}

#[tokio::test]
async fn test_batch_persists_every_document() {
    init_tracing();
    let jobs: Vec<DocumentJob> = (0..8).map(titled).collect();
    let mut sink = InMemorySink::new();
    let report = PipelineWorker::new(pipeline())
        .with_max_workers(3)
        .run_batch(jobs, &mut sink, CancellationToken::new())
        .await;

    assert_eq!(report.total, 8);
    assert_eq!(report.persisted, 8);
    assert_eq!(report.failed(), 0);
    assert!(!report.cancelled);

    let titles: BTreeSet<String> = sink.records().iter().map(|r| r.core().title.clone()).collect();
    assert_eq!(titles.len(), 8);
    assert!(titles.contains("Article 7"));
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let jobs = vec![titled(1), untitled(), titled(2)];
    let mut sink = InMemorySink::new();
    let report = PipelineWorker::new(pipeline())
        .run_batch(jobs, &mut sink, CancellationToken::new())
        .await;

    assert_eq!(report.persisted, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].kind, "validation");
    assert_eq!(
        report.failures[0].locator.as_deref(),
        Some("/archive/lenin/works/1917/untitled.htm")
    );
    assert_eq!(report.failures_by_kind()["validation"], 1);
    assert!(report.summary().contains("validation: 1"));
}

#[tokio::test]
async fn test_cancelled_batch_starts_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut sink = InMemorySink::new();
    let report = PipelineWorker::new(pipeline())
        .run_batch((0..4).map(titled).collect(), &mut sink, cancel)
        .await;

    assert!(report.cancelled);
    assert_eq!(report.skipped, 4);
    assert!(sink.is_empty());
}

struct CancelAfterFirst {
    cancel: CancellationToken,
    records: Vec<UnifiedRecord>,
}

impl RecordSink for CancelAfterFirst {
    type Error = String;

    fn persist(&mut self, record: &UnifiedRecord) -> Result<(), String> {
        self.records.push(record.clone());
        self.cancel.cancel();
        Ok(())
    }
}

#[tokio::test]
async fn test_cancellation_discards_in_flight_results() {
    let cancel = CancellationToken::new();
    let mut sink = CancelAfterFirst {
        cancel: cancel.clone(),
        records: Vec::new(),
    };
    let report = PipelineWorker::new(pipeline())
        .with_max_workers(1)
        .run_batch((0..5).map(titled).collect(), &mut sink, cancel)
        .await;

    assert!(report.cancelled);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(report.persisted, 1);
    assert_eq!(report.persisted + report.discarded + report.skipped, 5);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_load_glossary_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glossary.json");
    std::fs::write(
        &path,
        r#"{"entries": [{"id": "engels-friedrich-1820", "name": "Frederick Engels",
            "variants": ["Friedrich Engels"], "slugs": ["engels"]}]}"#,
    )
    .unwrap();

    let glossary = load_glossary(&path, &CancellationToken::new()).await.unwrap();
    assert_eq!(glossary.len(), 1);
    assert!(glossary.get("engels-friedrich-1820").is_some());
}

#[tokio::test]
async fn test_load_glossary_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_glossary(&missing, &CancellationToken::new()).await,
        Err(PipelineError::Glossary(_))
    ));

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(matches!(
        load_glossary(&missing, &cancel).await,
        Err(PipelineError::Cancelled)
    ));
}

#[tokio::test]
async fn test_pipeline_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let glossary_path = dir.path().join("glossary.toml");
    std::fs::write(
        &glossary_path,
        "[[entries]]\nid = \"marx-karl-1818\"\nname = \"Karl Marx\"\nslugs = [\"marx\"]\n",
    )
    .unwrap();
    let config_path = dir.path().join("folio.toml");
    std::fs::write(
        &config_path,
        format!("max_workers = 2\nglossary_path = {:?}\n", glossary_path.display().to_string()),
    )
    .unwrap();

    let config = PipelineConfig::load(&config_path).unwrap();
    assert_eq!(config.max_workers, 2);

    let pipeline = pipeline_from_config(config, &CancellationToken::new()).await.unwrap();
    let record = pipeline
        .process(DocumentJob::new(RawDocument::new(CAPITAL_CH01.as_bytes(), CAPITAL_LOCATOR)))
        .unwrap();
    assert_eq!(record.authorship().canonical_author_ids, vec!["marx-karl-1818"]);
}

#[test]
fn test_invalid_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.toml");
    std::fs::write(&path, "max_workers = 0\n").unwrap();
    assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::Config(_))));
}

#[test]
fn test_flat_json_sink_writes_decodable_lines() {
    let record = pipeline()
        .process(DocumentJob::new(RawDocument::new(CAPITAL_CH01.as_bytes(), CAPITAL_LOCATOR)))
        .unwrap();
    let mut sink = FlatJsonSink::new(Vec::new());
    sink.persist(&record).unwrap();
    sink.persist(&record).unwrap();

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    let flat: FlatRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(from_flat(&flat).unwrap(), record);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_drafts_are_deterministic(title in "[A-Z][a-z]{2,12}", body in "[A-Za-z ,.]{0,160}") {
        let html = format!("<html><head><title>{}</title></head><body><p>{}</p></body></html>", title, body);
        let job = DocumentJob::new(RawDocument::new(html.into_bytes(), CAPITAL_LOCATOR));
        let pipeline = pipeline();
        prop_assert_eq!(pipeline.draft(job.clone()).unwrap(), pipeline.draft(job).unwrap());
    }

    #[test]
    fn prop_assembled_records_have_bounded_confidence(title in "[A-Z][a-z]{2,12}", body in "[A-Za-z ,.]{0,160}") {
        let html = format!("<html><head><title>{}</title></head><body><p>{}</p></body></html>", title, body);
        let record = pipeline()
            .process(DocumentJob::new(RawDocument::new(html.into_bytes(), CAPITAL_LOCATOR)))
            .unwrap();
        prop_assert!((0.0..=1.0).contains(&record.authorship().author_confidence));
        prop_assert!((0.0..=1.0).contains(&record.temporal().date_confidence));
        prop_assert!(!record.core().title.is_empty());
    }
}
