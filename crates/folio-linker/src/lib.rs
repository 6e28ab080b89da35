//! Folio Entity Linker
//!
//! Resolves free-text person and organization names to canonical ids in a
//! reference glossary.
//!
//! Names are normalized (NFKD, combining marks stripped, lower-cased,
//! whitespace collapsed) and matched exactly first, then by normalized
//! Levenshtein similarity against every name and variant in the glossary.
//! A fuzzy match must score strictly above the configured threshold.
//!
//! The glossary is loaded once and shared read-only between workers:
//!
//! ```
//! use folio_linker::{EntityKind, EntityLinker, Glossary, GlossaryEntry, LinkerConfig};
//! use std::sync::Arc;
//!
//! let glossary = Glossary::new(vec![
//!     GlossaryEntry::new("marx-karl-1818", "Karl Marx", EntityKind::Person).with_slug("marx"),
//! ])
//! .unwrap();
//! let linker = EntityLinker::new(Arc::new(glossary), LinkerConfig::default());
//!
//! assert_eq!(linker.link("karl  MARX").canonical_id(), Some("marx-karl-1818"));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod glossary;
mod linker;
mod normalize;

pub use config::LinkerConfig;
pub use error::LinkerError;
pub use glossary::{EntityKind, Glossary, GlossaryEntry};
pub use linker::{EntityLinker, Resolution};
pub use normalize::normalize_name;
