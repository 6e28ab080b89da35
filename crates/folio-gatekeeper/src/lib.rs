//! Folio Gatekeeper
//!
//! Schema Assembler: validates record drafts and assembles immutable
//! [`folio_domain::UnifiedRecord`]s.
//!
//! The Gatekeeper provides:
//! - A composable rule tree ([`Rule`]) with `all` / `any` / `not` nodes
//! - The record rule set: required layer-1 fields, formats, confidence
//!   bounds and cross-field consistency
//! - Assembly that stamps the processing timestamp exactly once
//!
//! Validation collects every violation before failing, so a rejected
//! draft reports all of its problems together.
//!
//! # Examples
//!
//! ```
//! use folio_gatekeeper::{Gatekeeper, GatekeeperConfig};
//! use folio_domain::{DocumentType, RecordDraft, TechnicalDraft};
//!
//! let gatekeeper = Gatekeeper::new(GatekeeperConfig::default());
//! let draft = RecordDraft {
//!     core: Default::default(),
//!     authorship: Default::default(),
//!     temporal: Default::default(),
//!     technical: TechnicalDraft::unknown(DocumentType::Markup, "0.1.0"),
//!     semantic: Default::default(),
//! };
//!
//! let err = gatekeeper.assemble(draft).unwrap_err();
//! assert!(err.messages().contains(&"title: required field missing".to_string()));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod rules;
mod validator;

pub use config::GatekeeperConfig;
pub use error::{GatekeeperError, SchemaValidationError};
pub use rules::{Rule, Violation};
pub use validator::{record_rules, Gatekeeper, MAX_INFERRED_CONFIDENCE};
