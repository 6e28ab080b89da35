//! Outcome of a batch migration

use crate::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One legacy record that did not migrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationFailure {
    /// Index of the record in the batch
    pub index: usize,

    /// Locator of the record, when it had one
    pub locator: Option<String>,

    /// Stage that failed
    pub stage: Stage,

    /// Error message
    pub error: String,
}

/// Per-record tally of a batch migration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Records assembled, verified and finalized
    pub succeeded: usize,

    /// Records rolled back
    pub failed: usize,

    /// Why each failed record failed, in batch order
    pub failures: Vec<MigrationFailure>,

    /// Index of the first record not yet handled
    pub resume_index: usize,

    /// Whether records were kept from the sink
    pub dry_run: bool,
}

impl MigrationReport {
    /// Create an empty report starting at `start`
    pub fn new(start: usize, dry_run: bool) -> Self {
        Self {
            resume_index: start,
            dry_run,
            ..Self::default()
        }
    }

    /// Record a migrated record
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Record a rolled-back record
    pub fn record_failure(&mut self, failure: MigrationFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Records handled by this batch call
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether every record up to `total` has been handled
    pub fn is_complete(&self, total: usize) -> bool {
        self.resume_index >= total
    }

    /// Failure counts per stage
    pub fn failures_by_stage(&self) -> BTreeMap<Stage, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.stage).or_insert(0) += 1;
        }
        counts
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Migration Summary".to_string(),
            "=================".to_string(),
            format!("Succeeded: {}", self.succeeded),
            format!("Failed: {}", self.failed),
            format!("Resume index: {}", self.resume_index),
        ];
        if self.dry_run {
            lines.push("DRY RUN: nothing persisted".to_string());
        }

        let by_stage = self.failures_by_stage();
        if !by_stage.is_empty() {
            lines.push(String::new());
            lines.push("Failures by stage:".to_string());
            for (stage, count) in &by_stage {
                lines.push(format!("  {}: {}", stage, count));
            }
        }

        lines.join("\n")
    }
}
