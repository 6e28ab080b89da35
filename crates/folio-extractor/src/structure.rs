//! Structural Analyzer
//!
//! Recovers heading structure and document-level flags from normalized
//! markup. Never fails: markup that cannot be analysed yields an empty
//! report marked `degraded`.

use crate::config::ExtractorConfig;
use crate::document::{collapse_whitespace, ParsedDocument};
use crate::patterns::{
    ANY_HEADING, ELEMENT_TAG, EXTERNAL_PLACEHOLDER, HEADINGS, ID_OR_CLASS, LFS_OID, LFS_VERSION,
    LINKS, PARAGRAPHS,
};
use folio_domain::flat::HEADING_LEVELS;
use folio_domain::DocumentType;
use scraper::Html;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Structural facts about one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructureReport {
    /// Heading counts keyed `h1`..`h6`
    pub heading_counts: BTreeMap<String, u64>,

    /// Table of contents detected
    pub has_table_of_contents: bool,

    /// Several independent works in one document
    pub is_anthology: bool,

    /// Content is a pointer to external storage
    pub is_externally_stored: bool,

    /// Analysis fell back to defaults
    pub degraded: bool,
}

impl StructureReport {
    fn degraded(is_externally_stored: bool) -> Self {
        Self {
            heading_counts: HEADING_LEVELS.iter().map(|l| (l.to_string(), 0)).collect(),
            is_externally_stored,
            degraded: true,
            ..Self::default()
        }
    }
}

/// Structural analyzer
#[derive(Debug, Clone)]
pub struct StructuralAnalyzer {
    toc_min_links: usize,
    toc_link_ratio: f64,
    anthology_min_titles: usize,
}

impl Default for StructuralAnalyzer {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl StructuralAnalyzer {
    /// Create an analyzer from extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            toc_min_links: config.toc_min_links,
            toc_link_ratio: config.toc_link_ratio,
            anthology_min_titles: config.anthology_min_titles,
        }
    }

    /// Analyze normalized markup
    pub fn analyze(&self, markup: &str) -> StructureReport {
        if !looks_like_markup(markup) {
            return self.degraded(markup);
        }
        let html = Html::parse_document(markup);
        self.analyze_html(markup, &html, count_provenance_blocks(markup))
    }

    /// Analyze an already parsed document
    ///
    /// Returns `None` for non-markup documents, whose structure is unknown.
    pub fn analyze_document(&self, doc: &ParsedDocument) -> Option<StructureReport> {
        if doc.document_type != DocumentType::Markup {
            return None;
        }
        match &doc.html {
            Some(html) if looks_like_markup(&doc.text) => {
                Some(self.analyze_html(&doc.text, html, doc.provenance_blocks))
            }
            _ => Some(self.degraded(&doc.text)),
        }
    }

    fn degraded(&self, text: &str) -> StructureReport {
        warn!("Markup has no element structure, structural analysis degraded");
        StructureReport::degraded(is_externally_stored(text))
    }

    fn analyze_html(&self, raw: &str, html: &Html, provenance_blocks: usize) -> StructureReport {
        let heading_counts: BTreeMap<String, u64> = HEADING_LEVELS
            .iter()
            .zip(HEADINGS.iter())
            .map(|(level, sel)| (level.to_string(), html.select(sel).count() as u64))
            .collect();

        let has_table_of_contents = self.detect_toc(html);
        let is_anthology = self.detect_anthology(html, provenance_blocks);
        let is_externally_stored = is_externally_stored(raw);

        debug!(
            "Structure: headings {:?}, toc {}, anthology {}, external {}",
            heading_counts, has_table_of_contents, is_anthology, is_externally_stored
        );

        StructureReport {
            heading_counts,
            has_table_of_contents,
            is_anthology,
            is_externally_stored,
            degraded: false,
        }
    }

    fn detect_toc(&self, html: &Html) -> bool {
        let explicit_marker = html.select(&ID_OR_CLASS).any(|el| {
            let value = el.value();
            value.id().is_some_and(names_toc) || value.classes().any(names_toc)
        });
        if explicit_marker {
            return true;
        }

        let contents_heading = html.select(&ANY_HEADING).any(|el| {
            let text = collapse_whitespace(&el.text().collect::<String>()).to_lowercase();
            let text = text.trim_end_matches(':');
            text == "contents" || text == "table of contents"
        });
        if contents_heading {
            return true;
        }

        let links = html
            .select(&LINKS)
            .filter(|el| el.value().attr("href").is_some_and(is_local_href))
            .count();
        let paragraphs = html.select(&PARAGRAPHS).count().max(1);
        links >= self.toc_min_links && links as f64 / paragraphs as f64 >= self.toc_link_ratio
    }

    fn detect_anthology(&self, html: &Html, provenance_blocks: usize) -> bool {
        if provenance_blocks >= 2 {
            return true;
        }
        let titles: BTreeSet<String> = html
            .select(&HEADINGS[0])
            .map(|el| collapse_whitespace(&el.text().collect::<String>()).to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        titles.len() >= self.anthology_min_titles
    }
}

/// Whether text replaces the document with an external-storage pointer
pub fn is_externally_stored(text: &str) -> bool {
    (LFS_VERSION.is_match(text) && LFS_OID.is_match(text)) || EXTERNAL_PLACEHOLDER.is_match(text)
}

fn looks_like_markup(text: &str) -> bool {
    !text.trim().is_empty() && ELEMENT_TAG.is_match(text)
}

fn names_toc(name: &str) -> bool {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case("toc") || token.eq_ignore_ascii_case("contents"))
}

fn is_local_href(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    !(href.is_empty()
        || href.starts_with("http://")
        || href.starts_with("https://")
        || href.starts_with("mailto:")
        || href.starts_with("javascript:"))
}

fn count_provenance_blocks(markup: &str) -> usize {
    ParsedDocument::parse(markup, DocumentType::Markup, "/").provenance_blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> StructuralAnalyzer {
        StructuralAnalyzer::default()
    }

    #[test]
    fn test_heading_counts() {
        let report = analyzer().analyze("<html><body><h1>A</h1><h2>B</h2><h2>C</h2><p>x</p></body></html>");
        assert_eq!(report.heading_counts["h1"], 1);
        assert_eq!(report.heading_counts["h2"], 2);
        assert_eq!(report.heading_counts["h6"], 0);
        assert!(!report.degraded);
        assert!(!report.has_table_of_contents);
    }

    #[test]
    fn test_explicit_toc_marker() {
        let report = analyzer().analyze(r#"<html><body><div class="toc"><a href="ch01.htm">1</a></div></body></html>"#);
        assert!(report.has_table_of_contents);
    }

    #[test]
    fn test_contents_heading() {
        let report = analyzer().analyze("<html><body><h3>Table of Contents</h3><p>x</p></body></html>");
        assert!(report.has_table_of_contents);
    }

    #[test]
    fn test_link_density_toc() {
        let links: String = (1..=10).map(|i| format!(r#"<a href="ch{:02}.htm">Chapter {}</a><br>"#, i, i)).collect();
        let page = format!("<html><body><p>Capital, Volume I</p>{}</body></html>", links);
        assert!(analyzer().analyze(&page).has_table_of_contents);
    }

    #[test]
    fn test_external_links_do_not_count_as_toc() {
        let links: String = (1..=10)
            .map(|i| format!(r#"<a href="https://example.org/{}">x</a>"#, i))
            .collect();
        let page = format!("<html><body><p>Links</p>{}</body></html>", links);
        assert!(!analyzer().analyze(&page).has_table_of_contents);
    }

    #[test]
    fn test_anthology_by_titles() {
        let page = "<html><body><h1>Wage Labour</h1><h1>Value, Price and Profit</h1><h1>Critique</h1></body></html>";
        assert!(analyzer().analyze(page).is_anthology);
    }

    #[test]
    fn test_anthology_by_provenance_blocks() {
        let page = r#"<html><body>
<h1>Two Articles</h1>
<p class="information"><span class="info">Written:</span> 1853</p>
<p>First article.</p>
<p class="information"><span class="info">Written:</span> 1854</p>
<p>Second article.</p>
</body></html>"#;
        assert!(analyzer().analyze(page).is_anthology);
    }

    #[test]
    fn test_lfs_pointer_is_external_and_degraded() {
        let pointer = "version https://git-lfs.github.com/spec/v1\noid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393\nsize 12345\n";
        let report = analyzer().analyze(pointer);
        assert!(report.is_externally_stored);
        assert!(report.degraded);
        assert_eq!(report.heading_counts.len(), 6);
    }

    #[test]
    fn test_placeholder_comment() {
        let page = "<html><body><!-- external-storage: gs://bucket/capital.pdf --></body></html>";
        assert!(analyzer().analyze(page).is_externally_stored);
    }

    #[test]
    fn test_malformed_input_degrades() {
        for input in ["", "   ", "just some words with no tags"] {
            let report = analyzer().analyze(input);
            assert!(report.degraded);
            assert!(!report.has_table_of_contents);
            assert!(!report.is_anthology);
            assert!(report.heading_counts.values().all(|c| *c == 0));
        }
    }

    #[test]
    fn test_non_markup_documents_are_skipped() {
        let doc = ParsedDocument::parse("plain words", DocumentType::PlainText, "/notes.txt");
        assert!(analyzer().analyze_document(&doc).is_none());
    }
}
