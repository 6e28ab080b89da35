//! Gatekeeper error types

use crate::rules::Violation;
use thiserror::Error;

/// A draft failed validation; nothing was assembled
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Schema validation failed for {}: {}", .locator.as_deref().unwrap_or("<no locator>"), format_violations(.violations))]
pub struct SchemaValidationError {
    /// Locator of the document, when the draft had one
    pub locator: Option<String>,

    /// Every violation found, in rule order
    pub violations: Vec<Violation>,
}

impl SchemaValidationError {
    /// Violations rendered as `field: rule`
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(Violation::to_string).collect()
    }

    /// Whether a violation for `field` was reported
    pub fn has_violation(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Draft failed validation
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// Sink rejected the assembled record
    #[error("Sink error: {0}")]
    Sink(String),
}
