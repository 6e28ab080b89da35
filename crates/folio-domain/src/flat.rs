//! Flat key/value form of a [`UnifiedRecord`]
//!
//! Columnar and document stores take records as a single map. Keys are
//! `layer.field`; every key is always present and unknown values are
//! `null`, so a missing key is an encoding error rather than "unknown".
//!
//! Conversion is lossless: `from_flat(&to_flat(r)) == r`.

use crate::record::{
    AuthorshipProvenance, Breadcrumb, CoreIdentification, DocumentType, SemanticEnrichment,
    TechnicalProcessing, TemporalClassification, UnifiedRecord,
};
use crate::{ContentFingerprint, IsoDate, LanguageCode, ProvenanceSource, SectionClass};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Heading levels carried as `technical.heading_counts.<level>`
pub const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Every key of the flat form
pub const KEYS: &[&str] = &[
    "core.source_locator",
    "core.title",
    "core.content_fingerprint",
    "core.section",
    "core.language",
    "core.original_encoding",
    "core.was_normalized",
    "authorship.authors",
    "authorship.author_source",
    "authorship.author_confidence",
    "authorship.transcribers",
    "authorship.organizations",
    "authorship.recipients",
    "authorship.canonical_author_ids",
    "temporal.written_date",
    "temporal.published_date",
    "temporal.date_source",
    "temporal.date_confidence",
    "temporal.time_period",
    "temporal.movements",
    "temporal.subject_categories",
    "technical.document_type",
    "technical.byte_size",
    "technical.word_count",
    "technical.character_count",
    "technical.heading_counts.h1",
    "technical.heading_counts.h2",
    "technical.heading_counts.h3",
    "technical.heading_counts.h4",
    "technical.heading_counts.h5",
    "technical.heading_counts.h6",
    "technical.has_table_of_contents",
    "technical.is_anthology",
    "technical.is_externally_stored",
    "technical.structure_degraded",
    "technical.processing_timestamp",
    "technical.processor_version",
    "semantic.keywords",
    "semantic.description",
    "semantic.cross_references",
    "semantic.linked_entities",
    "semantic.breadcrumb_labels",
    "semantic.breadcrumb_locators",
    "semantic.collection_id",
    "semantic.work_id",
    "semantic.chapter_number",
    "semantic.source_periodical",
    "semantic.issue_date",
];

/// Errors decoding a flat record
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlatError {
    /// A key of the flat form is absent
    #[error("Missing key: {0}")]
    MissingKey(String),

    /// A value has the wrong shape or fails its domain rule
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Offending key
        key: String,
        /// What was wrong
        reason: String,
    },
}

/// A record as one flat map
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRecord(BTreeMap<String, Value>);

impl FlatRecord {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a key, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Iterate keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<UnifiedRecord> for FlatRecord {
    fn from(record: UnifiedRecord) -> Self {
        to_flat(&record)
    }
}

impl TryFrom<FlatRecord> for UnifiedRecord {
    type Error = FlatError;

    fn try_from(flat: FlatRecord) -> Result<Self, FlatError> {
        from_flat(&flat)
    }
}

impl From<BTreeMap<String, Value>> for FlatRecord {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Flatten a record
pub fn to_flat(record: &UnifiedRecord) -> FlatRecord {
    let mut flat = FlatRecord::new();

    let core = record.core();
    flat.insert("core.source_locator", Value::from(core.source_locator.clone()));
    flat.insert("core.title", Value::from(core.title.clone()));
    flat.insert("core.content_fingerprint", Value::from(core.content_fingerprint.to_string()));
    flat.insert("core.section", Value::from(core.section.as_str()));
    flat.insert("core.language", Value::from(core.language.as_str()));
    flat.insert("core.original_encoding", Value::from(core.original_encoding.clone()));
    flat.insert("core.was_normalized", Value::from(core.was_normalized));

    let a = record.authorship();
    flat.insert("authorship.authors", strings(&a.authors));
    flat.insert("authorship.author_source", source(a.author_source));
    flat.insert("authorship.author_confidence", number(a.author_confidence));
    flat.insert("authorship.transcribers", strings(&a.transcribers));
    flat.insert("authorship.organizations", strings(&a.organizations));
    flat.insert("authorship.recipients", strings(&a.recipients));
    flat.insert("authorship.canonical_author_ids", strings(&a.canonical_author_ids));

    let t = record.temporal();
    flat.insert("temporal.written_date", date(t.written_date));
    flat.insert("temporal.published_date", date(t.published_date));
    flat.insert("temporal.date_source", source(t.date_source));
    flat.insert("temporal.date_confidence", number(t.date_confidence));
    flat.insert("temporal.time_period", optional(t.time_period.clone()));
    flat.insert("temporal.movements", strings(&t.movements));
    flat.insert("temporal.subject_categories", strings(&t.subject_categories));

    let tech = record.technical();
    flat.insert("technical.document_type", Value::from(tech.document_type.as_str()));
    flat.insert("technical.byte_size", optional(tech.byte_size));
    flat.insert("technical.word_count", optional(tech.word_count));
    flat.insert("technical.character_count", optional(tech.character_count));
    for level in HEADING_LEVELS {
        flat.insert(
            format!("technical.heading_counts.{}", level),
            optional(tech.heading_counts.get(level).copied()),
        );
    }
    flat.insert("technical.has_table_of_contents", optional(tech.has_table_of_contents));
    flat.insert("technical.is_anthology", optional(tech.is_anthology));
    flat.insert("technical.is_externally_stored", optional(tech.is_externally_stored));
    flat.insert("technical.structure_degraded", optional(tech.structure_degraded));
    flat.insert(
        "technical.processing_timestamp",
        Value::from(tech.processing_timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    flat.insert("technical.processor_version", Value::from(tech.processor_version.clone()));

    let s = record.semantic();
    flat.insert("semantic.keywords", strings(&s.keywords));
    flat.insert("semantic.description", optional(s.description.clone()));
    flat.insert("semantic.cross_references", strings(&s.cross_references));
    flat.insert("semantic.linked_entities", strings(&s.linked_entities));
    let labels: Vec<String> = s.breadcrumb.iter().map(|b| b.label.clone()).collect();
    let locators: Vec<String> = s.breadcrumb.iter().map(|b| b.locator.clone()).collect();
    flat.insert("semantic.breadcrumb_labels", strings(&labels));
    flat.insert("semantic.breadcrumb_locators", strings(&locators));
    flat.insert("semantic.collection_id", optional(s.collection_id.clone()));
    flat.insert("semantic.work_id", optional(s.work_id.clone()));
    flat.insert("semantic.chapter_number", optional(s.chapter_number));
    flat.insert("semantic.source_periodical", optional(s.source_periodical.clone()));
    flat.insert("semantic.issue_date", date(s.issue_date));

    flat
}

/// Rebuild a record from its flat form
///
/// Keys outside [`KEYS`] are ignored.
///
/// # Errors
/// [`FlatError::MissingKey`] for any absent key, [`FlatError::InvalidValue`]
/// for values of the wrong shape or failing their domain rule
pub fn from_flat(flat: &FlatRecord) -> Result<UnifiedRecord, FlatError> {
    let r = Reader(flat);

    let core = CoreIdentification {
        source_locator: r.string("core.source_locator")?,
        title: r.string("core.title")?,
        content_fingerprint: r.parse("core.content_fingerprint", ContentFingerprint::from_hex)?,
        section: r.parse("core.section", |s| {
            SectionClass::parse(s).ok_or_else(|| format!("unknown section '{}'", s))
        })?,
        language: r.parse("core.language", LanguageCode::new)?,
        original_encoding: r.string("core.original_encoding")?,
        was_normalized: r.boolean("core.was_normalized")?,
    };

    let authorship = AuthorshipProvenance {
        authors: r.strings("authorship.authors")?,
        author_source: r.source("authorship.author_source")?,
        author_confidence: r.confidence("authorship.author_confidence")?,
        transcribers: r.strings("authorship.transcribers")?,
        organizations: r.strings("authorship.organizations")?,
        recipients: r.strings("authorship.recipients")?,
        canonical_author_ids: r.strings("authorship.canonical_author_ids")?,
    };

    let temporal = TemporalClassification {
        written_date: r.date("temporal.written_date")?,
        published_date: r.date("temporal.published_date")?,
        date_source: r.source("temporal.date_source")?,
        date_confidence: r.confidence("temporal.date_confidence")?,
        time_period: r.opt_string("temporal.time_period")?,
        movements: r.strings("temporal.movements")?,
        subject_categories: r.strings("temporal.subject_categories")?,
    };

    let mut heading_counts = BTreeMap::new();
    for level in HEADING_LEVELS {
        if let Some(count) = r.opt_u64(&format!("technical.heading_counts.{}", level))? {
            heading_counts.insert(level.to_string(), count);
        }
    }
    let technical = TechnicalProcessing {
        document_type: r.parse("technical.document_type", |s| s.parse::<DocumentType>())?,
        byte_size: r.opt_u64("technical.byte_size")?,
        word_count: r.opt_u64("technical.word_count")?,
        character_count: r.opt_u64("technical.character_count")?,
        heading_counts,
        has_table_of_contents: r.opt_bool("technical.has_table_of_contents")?,
        is_anthology: r.opt_bool("technical.is_anthology")?,
        is_externally_stored: r.opt_bool("technical.is_externally_stored")?,
        structure_degraded: r.opt_bool("technical.structure_degraded")?,
        processing_timestamp: r.parse("technical.processing_timestamp", |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| e.to_string())
        })?,
        processor_version: r.string("technical.processor_version")?,
    };

    let labels = r.strings("semantic.breadcrumb_labels")?;
    let locators = r.strings("semantic.breadcrumb_locators")?;
    if labels.len() != locators.len() {
        return Err(FlatError::InvalidValue {
            key: "semantic.breadcrumb_locators".to_string(),
            reason: format!(
                "{} locators for {} labels",
                locators.len(),
                labels.len()
            ),
        });
    }
    let chapter_number = match r.opt_u64("semantic.chapter_number")? {
        Some(n) => Some(u32::try_from(n).map_err(|_| FlatError::InvalidValue {
            key: "semantic.chapter_number".to_string(),
            reason: format!("{} out of range", n),
        })?),
        None => None,
    };
    let semantic = SemanticEnrichment {
        keywords: r.strings("semantic.keywords")?,
        description: r.opt_string("semantic.description")?,
        cross_references: r.strings("semantic.cross_references")?,
        linked_entities: r.strings("semantic.linked_entities")?,
        breadcrumb: labels
            .into_iter()
            .zip(locators)
            .map(|(label, locator)| Breadcrumb { label, locator })
            .collect(),
        collection_id: r.opt_string("semantic.collection_id")?,
        work_id: r.opt_string("semantic.work_id")?,
        chapter_number,
        source_periodical: r.opt_string("semantic.source_periodical")?,
        issue_date: r.date("semantic.issue_date")?,
    };

    Ok(UnifiedRecord::from_layers(
        core, authorship, temporal, technical, semantic,
    ))
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::from).collect())
}

fn optional<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn source(value: Option<ProvenanceSource>) -> Value {
    optional(value.map(|s| s.as_str()))
}

fn date(value: Option<IsoDate>) -> Value {
    optional(value.map(|d| d.to_string()))
}

struct Reader<'a>(&'a FlatRecord);

impl Reader<'_> {
    fn value(&self, key: &str) -> Result<&Value, FlatError> {
        self.0
            .get(key)
            .ok_or_else(|| FlatError::MissingKey(key.to_string()))
    }

    fn invalid(key: &str, reason: impl Into<String>) -> FlatError {
        FlatError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    fn string(&self, key: &str) -> Result<String, FlatError> {
        self.opt_string(key)?
            .ok_or_else(|| Self::invalid(key, "expected string, found null"))
    }

    fn opt_string(&self, key: &str) -> Result<Option<String>, FlatError> {
        match self.value(key)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(Self::invalid(key, format!("expected string, found {}", other))),
        }
    }

    fn parse<T, F>(&self, key: &str, f: F) -> Result<T, FlatError>
    where
        F: FnOnce(&str) -> Result<T, String>,
    {
        let s = self.string(key)?;
        f(&s).map_err(|reason| Self::invalid(key, reason))
    }

    fn strings(&self, key: &str) -> Result<Vec<String>, FlatError> {
        match self.value(key)? {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(Self::invalid(key, format!("expected string item, found {}", other))),
                })
                .collect(),
            other => Err(Self::invalid(key, format!("expected array, found {}", other))),
        }
    }

    fn boolean(&self, key: &str) -> Result<bool, FlatError> {
        self.opt_bool(key)?
            .ok_or_else(|| Self::invalid(key, "expected boolean, found null"))
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>, FlatError> {
        match self.value(key)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            other => Err(Self::invalid(key, format!("expected boolean, found {}", other))),
        }
    }

    fn opt_u64(&self, key: &str) -> Result<Option<u64>, FlatError> {
        match self.value(key)? {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| Self::invalid(key, format!("expected non-negative integer, found {}", n))),
            other => Err(Self::invalid(key, format!("expected integer, found {}", other))),
        }
    }

    fn confidence(&self, key: &str) -> Result<f64, FlatError> {
        match self.value(key)? {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| crate::confidence::is_unit_interval(*v))
                .ok_or_else(|| Self::invalid(key, format!("{} not in [0.0, 1.0]", n))),
            other => Err(Self::invalid(key, format!("expected number, found {}", other))),
        }
    }

    fn source(&self, key: &str) -> Result<Option<ProvenanceSource>, FlatError> {
        match self.opt_string(key)? {
            Some(s) => ProvenanceSource::parse(&s)
                .map(Some)
                .ok_or_else(|| Self::invalid(key, format!("unknown provenance source '{}'", s))),
            None => Ok(None),
        }
    }

    fn date(&self, key: &str) -> Result<Option<IsoDate>, FlatError> {
        match self.opt_string(key)? {
            Some(s) => IsoDate::parse_iso(&s)
                .map(Some)
                .map_err(|reason| Self::invalid(key, reason)),
            None => Ok(None),
        }
    }
}
