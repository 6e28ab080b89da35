//! Bounded parallel batch processing

use crate::{DocumentJob, Pipeline, PipelineError};
use folio_domain::traits::RecordSink;
use folio_domain::UnifiedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One document that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Locator of the document, when known
    pub locator: Option<String>,

    /// Error kind (`encoding`, `validation`, `sink`, …)
    pub kind: String,

    /// Error message
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Documents submitted
    pub total: usize,

    /// Records handed to the sink
    pub persisted: usize,

    /// Documents that failed, in completion order
    pub failures: Vec<DocumentFailure>,

    /// Finished after cancellation and dropped before persistence
    pub discarded: usize,

    /// Never started because of cancellation
    pub skipped: usize,

    /// Whether the batch was cancelled
    pub cancelled: bool,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record_failure(&mut self, locator: Option<String>, error: &PipelineError) {
        warn!(
            "Failed {}: {}",
            locator.as_deref().unwrap_or("<unknown>"),
            error
        );
        self.failures.push(DocumentFailure {
            locator,
            kind: error.kind().to_string(),
            error: error.to_string(),
        });
    }

    /// Number of failed documents
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Failure counts per error kind
    pub fn failures_by_kind(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Summary".to_string(),
            "=============".to_string(),
            format!("Documents: {}", self.total),
            format!("Persisted: {}", self.persisted),
            format!("Failed: {}", self.failed()),
        ];
        if self.cancelled {
            lines.push(format!(
                "Cancelled: {} discarded, {} skipped",
                self.discarded, self.skipped
            ));
        }

        let by_kind = self.failures_by_kind();
        if !by_kind.is_empty() {
            lines.push(String::new());
            lines.push("Failures by kind:".to_string());
            for (kind, count) in &by_kind {
                lines.push(format!("  {}: {}", kind, count));
            }
        }

        lines.join("\n")
    }
}

type TaskOutput = (String, Result<UnifiedRecord, PipelineError>);

/// Runs a pipeline over batches of documents
///
/// Documents are processed in parallel, at most `max_workers` at a time,
/// each on the blocking pool. Records reach the sink in completion order
/// from the calling task only, so the sink needs no synchronization.
///
/// # Examples
///
/// ```no_run
/// use folio_pipeline::{DocumentJob, InMemorySink, Pipeline, PipelineConfig, PipelineWorker};
/// use folio_extractor::RawDocument;
/// use folio_linker::Glossary;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Glossary::default()))?;
///     let worker = PipelineWorker::new(Arc::new(pipeline));
///
///     let jobs = vec![DocumentJob::new(RawDocument::new(
///         b"<html><head><title>Letter</title></head></html>".to_vec(),
///         "/archive/marx/works/1868/letters/68_01_08.htm",
///     ))];
///     let mut sink = InMemorySink::new();
///     let report = worker.run_batch(jobs, &mut sink, CancellationToken::new()).await;
///     println!("{}", report.summary());
///     Ok(())
/// }
/// ```
pub struct PipelineWorker {
    pipeline: Arc<Pipeline>,
    max_workers: usize,
}

impl PipelineWorker {
    /// Create a worker sized by the pipeline's `max_workers`
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let max_workers = pipeline.config().max_workers.max(1);
        Self {
            pipeline,
            max_workers,
        }
    }

    /// Override the number of parallel documents
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Get the pipeline
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Process a batch, persisting records as they complete
    ///
    /// A failed document never stops the batch. Once `cancel` fires no
    /// new document starts, and documents still in flight are discarded
    /// instead of persisted.
    pub async fn run_batch<S>(&self, jobs: Vec<DocumentJob>, sink: &mut S, cancel: CancellationToken) -> BatchReport
    where
        S: RecordSink,
        S::Error: std::fmt::Display,
    {
        let mut report = BatchReport::new(jobs.len());
        info!(
            "Starting batch of {} documents with {} workers",
            report.total, self.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut started = 0;

        for job in jobs {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            while let Some(joined) = tasks.try_join_next() {
                self.settle(joined, sink, &cancel, &mut report);
            }
            if cancel.is_cancelled() {
                break;
            }

            let pipeline = Arc::clone(&self.pipeline);
            let locator = job.raw.locator.clone();
            debug!("Processing {}", locator);
            tasks.spawn(async move {
                let _permit = permit;
                let result = tokio::task::spawn_blocking(move || pipeline.process(job))
                    .await
                    .unwrap_or_else(|e| Err(PipelineError::Join(e.to_string())));
                (locator, result)
            });
            started += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            self.settle(joined, sink, &cancel, &mut report);
        }

        report.skipped = report.total - started;
        report.cancelled = cancel.is_cancelled();
        if report.cancelled {
            info!(
                "Batch cancelled: {} persisted, {} discarded, {} skipped",
                report.persisted, report.discarded, report.skipped
            );
        } else {
            info!(
                "Batch finished: {} persisted, {} failed",
                report.persisted,
                report.failed()
            );
        }
        report
    }

    fn settle<S>(
        &self,
        joined: Result<TaskOutput, JoinError>,
        sink: &mut S,
        cancel: &CancellationToken,
        report: &mut BatchReport,
    ) where
        S: RecordSink,
        S::Error: std::fmt::Display,
    {
        let (locator, result) = match joined {
            Ok(output) => output,
            Err(e) => {
                report.record_failure(None, &PipelineError::Join(e.to_string()));
                return;
            }
        };

        if cancel.is_cancelled() {
            debug!("Discarding {} after cancellation", locator);
            report.discarded += 1;
            return;
        }

        match result {
            Ok(record) => match sink.persist(&record) {
                Ok(()) => report.persisted += 1,
                Err(e) => report.record_failure(Some(locator), &PipelineError::Sink(e.to_string())),
            },
            Err(e) => report.record_failure(Some(locator), &e),
        }
    }
}
