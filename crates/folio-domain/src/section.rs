//! Section classification - which part of the archive a document lives in

use serde::{Deserialize, Serialize};

/// Archive section a document belongs to
///
/// The two encyclopedias are the `history/etol` and `history/erol`
/// subtrees, which carry their own writer indexes and movement focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionClass {
    /// Author archive (`/archive/…`) and general history pages
    Archive,

    /// First encyclopedia subtree (`/history/etol/…`)
    EncyclopediaA,

    /// Second encyclopedia subtree (`/history/erol/…`)
    EncyclopediaB,

    /// Subject index (`/subject/…`)
    SubjectIndex,

    /// Glossary of people, organisations, terms (`/glossary/…`)
    Glossary,

    /// Reference library (`/reference/…`)
    Reference,
}

impl SectionClass {
    /// Get the section name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionClass::Archive => "archive",
            SectionClass::EncyclopediaA => "encyclopedia-a",
            SectionClass::EncyclopediaB => "encyclopedia-b",
            SectionClass::SubjectIndex => "subject-index",
            SectionClass::Glossary => "glossary",
            SectionClass::Reference => "reference",
        }
    }

    /// Parse a section from its string form
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "archive" => Some(SectionClass::Archive),
            "encyclopedia-a" => Some(SectionClass::EncyclopediaA),
            "encyclopedia-b" => Some(SectionClass::EncyclopediaB),
            "subject-index" => Some(SectionClass::SubjectIndex),
            "glossary" => Some(SectionClass::Glossary),
            "reference" => Some(SectionClass::Reference),
            _ => None,
        }
    }

    /// Classify a document from its locator path segments
    ///
    /// The first segment naming a section wins, so
    /// `/archive/marx/glossary.htm` is still an archive document.
    pub fn from_path_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        for (idx, seg) in segments.iter().enumerate() {
            match seg.as_ref().to_lowercase().as_str() {
                "archive" => return Some(SectionClass::Archive),
                "history" => {
                    let next = segments.get(idx + 1).map(|s| s.as_ref().to_lowercase());
                    return match next.as_deref() {
                        Some("etol") => Some(SectionClass::EncyclopediaA),
                        Some("erol") => Some(SectionClass::EncyclopediaB),
                        _ => Some(SectionClass::Archive),
                    };
                }
                "subject" => return Some(SectionClass::SubjectIndex),
                "glossary" => return Some(SectionClass::Glossary),
                "reference" => return Some(SectionClass::Reference),
                _ => {}
            }
        }
        None
    }

    /// Classify a document from its locator
    pub fn from_locator(locator: &str) -> Option<Self> {
        Self::from_path_segments(&crate::locator::path_segments(locator))
    }
}

impl std::fmt::Display for SectionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid section classification: {}", s))
    }
}
