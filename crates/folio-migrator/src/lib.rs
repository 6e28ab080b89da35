//! Folio Migrator
//!
//! Migration Adapter: converts legacy flat metadata records into
//! [`folio_domain::UnifiedRecord`]s, one direction only.
//!
//! # Overview
//!
//! A legacy record carries a handful of fields: locator, title, one
//! author string, one date string, language, document type, word count
//! and a truncated content hash. Migration maps those onto the layered
//! record and leaves everything else explicitly absent:
//!
//! | Legacy field | Unified field | Notes |
//! |--------------|---------------|-------|
//! | `source_url` | `core.source_locator` | required |
//! | `title` | `core.title` | required |
//! | `content_hash` | `core.content_fingerprint` | required, 16 hex |
//! | `language` | `core.language` | defaults to `en` |
//! | `author` | `authorship.authors` | `legacy-migrated`, confidence 0.5 |
//! | `date` | `temporal.written_date` | `legacy-migrated`, confidence 0.5 |
//! | `doc_type` | `technical.document_type` | sniffed from the locator when absent |
//! | `word_count` | `technical.word_count` | |
//!
//! # Usage
//!
//! ```no_run
//! use folio_migrator::{load_legacy_dir, Migrator, MigratorConfig};
//! use folio_domain::{RecordSink, UnifiedRecord};
//! use std::path::Path;
//!
//! struct Stdout;
//! impl RecordSink for Stdout {
//!     type Error = String;
//!     fn persist(&mut self, record: &UnifiedRecord) -> Result<(), String> {
//!         println!("{}", record.locator());
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let load = load_legacy_dir(Path::new("metadata/json"))?;
//! for failure in &load.failures {
//!     eprintln!("skipped {}: {}", failure.path.display(), failure.error);
//! }
//! let migrator = Migrator::new(MigratorConfig::default());
//!
//! let report = migrator.migrate_batch(&load.records, &mut Stdout);
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [migrator]
//! legacy_confidence = 0.5
//! default_language = "en"
//! dry_run = false
//! batch_limit = 500
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod legacy;
mod migrator;
mod report;
mod strategy;

pub use config::MigratorConfig;
pub use error::{MigrationError, Stage};
pub use legacy::{load_legacy_dir, LegacyLoad, LegacyRecord, LoadFailure};
pub use migrator::Migrator;
pub use report::{MigrationFailure, MigrationReport};
pub use strategy::{LegacyFlatStrategy, MigrationStrategy, UNKNOWN_ENCODING};
