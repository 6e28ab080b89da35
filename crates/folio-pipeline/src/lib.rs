//! Folio Pipeline
//!
//! Wires the extraction stages into one run:
//!
//! ```text
//! RawDocument → normalize → analyze → parse → extract → link → draft → assemble → sink
//! ```
//!
//! - [`Pipeline`] processes a single document synchronously
//! - [`PipelineWorker`] runs batches with bounded parallelism and
//!   cooperative cancellation
//! - [`PipelineConfig`] gathers every stage's configuration in one TOML file
//!
//! The glossary and configuration are loaded once and shared read-only.
//! Nothing else is shared between documents.
//!
//! # Example
//!
//! ```
//! use folio_pipeline::{DocumentJob, Pipeline, PipelineConfig};
//! use folio_extractor::RawDocument;
//! use folio_linker::Glossary;
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Glossary::default())).unwrap();
//! let raw = RawDocument::new(
//!     b"<html><head><title>The State and Revolution</title></head><body><p>Text.</p></body></html>".to_vec(),
//!     "https://www.marxists.org/archive/lenin/works/1917/staterev/index.htm",
//! );
//!
//! let record = pipeline.process(DocumentJob::new(raw)).unwrap();
//! assert_eq!(record.core().title, "The State and Revolution");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod glossary;
mod pipeline;
mod sink;
mod worker;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use glossary::{load_glossary, pipeline_from_config};
pub use pipeline::{DocumentJob, Pipeline, PROCESSOR_VERSION};
pub use sink::{FlatJsonSink, InMemorySink};
pub use worker::{BatchReport, DocumentFailure, PipelineWorker};
