//! Name → canonical id resolution

use crate::config::LinkerConfig;
use crate::glossary::Glossary;
use crate::normalize::normalize_name;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving one name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Resolution {
    /// Matched a glossary entry
    Resolved {
        /// Canonical id
        id: String,
        /// Similarity of the best matching name, 1.0 for exact matches
        similarity: f64,
        /// Whether the normalized names were equal
        exact: bool,
    },
    /// No entry matched closely enough
    Unresolved,
}

impl Resolution {
    /// Canonical id when resolved
    pub fn canonical_id(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { id, .. } => Some(id),
            Resolution::Unresolved => None,
        }
    }

    /// Whether the name was resolved
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Entity linker over a shared glossary
#[derive(Debug, Clone)]
pub struct EntityLinker {
    glossary: Arc<Glossary>,
    config: LinkerConfig,
}

impl EntityLinker {
    /// Create a linker
    pub fn new(glossary: Arc<Glossary>, config: LinkerConfig) -> Self {
        Self { glossary, config }
    }

    /// Glossary the linker resolves against
    pub fn glossary(&self) -> &Arc<Glossary> {
        &self.glossary
    }

    /// Resolve one name
    ///
    /// Exact normalized match first; otherwise the most similar name
    /// strictly above the fuzzy threshold. Ties go to the shorter id,
    /// then the lexicographically smaller one.
    pub fn link(&self, name: &str) -> Resolution {
        let key = normalize_name(name);
        if key.is_empty() {
            return Resolution::Unresolved;
        }

        if let Some(id) = self.glossary.exact_ids(&key).iter().min_by(|a, b| by_id(a, b)) {
            return Resolution::Resolved {
                id: id.clone(),
                similarity: 1.0,
                exact: true,
            };
        }

        if !self.config.fuzzy_enabled {
            return Resolution::Unresolved;
        }

        let mut best: Option<(&str, f64)> = None;
        for (candidate, id) in self.glossary.normalized_names() {
            let similarity = strsim::normalized_levenshtein(&key, candidate);
            if similarity <= self.config.fuzzy_threshold {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_id, best_sim)) => match similarity.total_cmp(&best_sim) {
                    Ordering::Greater => true,
                    Ordering::Equal => by_id(id, best_id) == Ordering::Less,
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some((id.as_str(), similarity));
            }
        }

        match best {
            Some((id, similarity)) => {
                debug!("Fuzzy match '{}' → {} ({:.3})", name, id, similarity);
                Resolution::Resolved {
                    id: id.to_string(),
                    similarity,
                    exact: false,
                }
            }
            None => {
                debug!("No glossary match for '{}'", name);
                Resolution::Unresolved
            }
        }
    }

    /// Resolve several names, preserving input order
    pub fn link_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<Resolution> {
        names.iter().map(|n| self.link(n.as_ref())).collect()
    }
}

fn by_id(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::{EntityKind, GlossaryEntry};

    fn linker(entries: Vec<GlossaryEntry>) -> EntityLinker {
        EntityLinker::new(Arc::new(Glossary::new(entries).unwrap()), LinkerConfig::default())
    }

    fn marx_only() -> EntityLinker {
        linker(vec![
            GlossaryEntry::new("marx-karl-1818", "Marx", EntityKind::Person).with_variant("Karl Marx"),
        ])
    }

    #[test]
    fn test_exact_match() {
        let resolution = marx_only().link("Karl Marx");
        assert_eq!(
            resolution,
            Resolution::Resolved {
                id: "marx-karl-1818".to_string(),
                similarity: 1.0,
                exact: true
            }
        );
    }

    #[test]
    fn test_exact_ignores_case_and_diacritics() {
        let linker = linker(vec![GlossaryEntry::new("jaures-jean-1859", "Jean Jaurès", EntityKind::Person)]);
        assert_eq!(linker.link("  JEAN   JAURES ").canonical_id(), Some("jaures-jean-1859"));
    }

    #[test]
    fn test_abbreviated_name_stays_unresolved() {
        // "k. marx" vs "karl marx" is well below 0.85
        assert_eq!(marx_only().link("K. Marx"), Resolution::Unresolved);
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let linker = linker(vec![GlossaryEntry::new(
            "luxemburg-rosa-1871",
            "Rosa Luxemburg",
            EntityKind::Person,
        )]);
        match linker.link("Rosa Luxembourg") {
            Resolution::Resolved { id, similarity, exact } => {
                assert_eq!(id, "luxemburg-rosa-1871");
                assert!(!exact);
                assert!(similarity > 0.85 && similarity < 1.0);
            }
            Resolution::Unresolved => panic!("expected a fuzzy match"),
        }
    }

    #[test]
    fn test_exact_only_config() {
        let glossary = Glossary::new(vec![GlossaryEntry::new(
            "luxemburg-rosa-1871",
            "Rosa Luxemburg",
            EntityKind::Person,
        )])
        .unwrap();
        let linker = EntityLinker::new(Arc::new(glossary), LinkerConfig::exact_only());
        assert_eq!(linker.link("Rosa Luxembourg"), Resolution::Unresolved);
    }

    #[test]
    fn test_tie_prefers_shorter_then_lexicographic_id() {
        let linker = linker(vec![
            GlossaryEntry::new("bauer-otto-1881", "Bauer", EntityKind::Person),
            GlossaryEntry::new("bauer-b", "Bauer", EntityKind::Person),
            GlossaryEntry::new("bauer-a", "Bauer", EntityKind::Person),
        ]);
        assert_eq!(linker.link("Bauer").canonical_id(), Some("bauer-a"));
    }

    #[test]
    fn test_link_all_preserves_order() {
        let resolutions = marx_only().link_all(&["K. Marx", "Karl Marx", ""]);
        assert_eq!(resolutions.len(), 3);
        assert!(!resolutions[0].is_resolved());
        assert!(resolutions[1].is_resolved());
        assert!(!resolutions[2].is_resolved());
    }
}
