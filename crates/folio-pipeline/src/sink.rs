//! Record sinks provided with the pipeline
//!
//! Real storage lives outside this workspace. These two cover tests and
//! simple exports.

use folio_domain::traits::RecordSink;
use folio_domain::{to_flat, UnifiedRecord};
use std::convert::Infallible;
use std::io::Write;

/// Keeps records in memory, in the order they were persisted
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    records: Vec<UnifiedRecord>,
}

impl InMemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records persisted so far
    pub fn records(&self) -> &[UnifiedRecord] {
        &self.records
    }

    /// Number of records persisted
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was persisted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take the records out of the sink
    pub fn into_records(self) -> Vec<UnifiedRecord> {
        self.records
    }
}

impl RecordSink for InMemorySink {
    type Error = Infallible;

    fn persist(&mut self, record: &UnifiedRecord) -> Result<(), Infallible> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Writes each record as one line of flat JSON
#[derive(Debug)]
pub struct FlatJsonSink<W: Write> {
    writer: W,
}

impl<W: Write> FlatJsonSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for FlatJsonSink<W> {
    type Error = std::io::Error;

    fn persist(&mut self, record: &UnifiedRecord) -> Result<(), std::io::Error> {
        serde_json::to_writer(&mut self.writer, &to_flat(record))?;
        self.writer.write_all(b"\n")
    }
}
