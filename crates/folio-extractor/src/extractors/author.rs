//! Author extraction
//!
//! | Priority | Source | Confidence |
//! |----------|--------|------------|
//! | 0 | manual override (short-circuits) | 1.0 |
//! | 1 | known author slug in the path | 1.0 |
//! | 2 | title text (`… by Name`, `Name: Title`) | 0.8 |
//! | 3 | `author` / `DC.creator` meta tags | 0.6 |
//! | 4 | body byline (`.author`, `by Name` paragraph) | 0.4 |

use super::{split_names, Extraction, FieldExtractor};
use crate::document::{ParsedDocument, SourceContext};
use crate::patterns::{BYLINE, LETTER_TO, SALUTATION, TITLE_BY, TITLE_NAME_PREFIX};
use folio_domain::record::push_unique;
use folio_domain::{Confidence, ProvenanceSource};

const TITLE_CONFIDENCE: f64 = 0.8;
const METADATA_CONFIDENCE: f64 = 0.6;
const BODY_CONFIDENCE: f64 = 0.4;

/// Paragraphs searched for bylines and salutations
const LEADING_PARAGRAPHS: usize = 5;

/// People and organizations involved besides the author
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contributors {
    /// Transcribers named in the provenance block
    pub transcribers: Vec<String>,
    /// Recipients of letters
    pub recipients: Vec<String>,
    /// Publishing organizations from metadata
    pub organizations: Vec<String>,
}

/// Author extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorExtractor;

impl FieldExtractor for AuthorExtractor {
    type Output = Vec<String>;

    fn extract(&self, doc: &ParsedDocument, ctx: &SourceContext) -> Extraction<Vec<String>> {
        if let Some(manual) = ctx.manual.as_ref().filter(|m| !m.authors.is_empty()) {
            let mut authors = Vec::new();
            for name in &manual.authors {
                push_unique(&mut authors, name.as_str());
            }
            return Extraction::found(authors, ProvenanceSource::Manual, Confidence::FULL);
        }

        if let Some(name) = from_path(ctx) {
            return Extraction::found(vec![name], ProvenanceSource::Path, Confidence::FULL);
        }

        let title = doc.title.as_deref().or(doc.h1_titles.first().map(String::as_str));
        if let Some(names) = title.and_then(|t| from_title(t, ctx)) {
            return Extraction::found(names, ProvenanceSource::Title, Confidence::clamped(TITLE_CONFIDENCE));
        }

        let mut meta_names = Vec::new();
        for value in doc.meta_values("author").iter().chain(doc.meta_values("dc.creator")) {
            for name in split_names(value) {
                push_unique(&mut meta_names, name);
            }
        }
        if !meta_names.is_empty() {
            return Extraction::found(
                meta_names,
                ProvenanceSource::EmbeddedMetadata,
                Confidence::clamped(METADATA_CONFIDENCE),
            );
        }

        let body_names = from_body(doc);
        if !body_names.is_empty() {
            return Extraction::found(
                body_names,
                ProvenanceSource::BodyContent,
                Confidence::clamped(BODY_CONFIDENCE),
            );
        }

        Extraction::absent()
    }
}

impl AuthorExtractor {
    /// Transcribers, recipients and organizations
    ///
    /// Found independently of which source produced the authors.
    pub fn contributors(&self, doc: &ParsedDocument) -> Contributors {
        let mut contributors = Contributors::default();

        for line in doc.provenance.iter().filter(|l| l.label.starts_with("transcri")) {
            for name in split_names(&line.value) {
                push_unique(&mut contributors.transcribers, name);
            }
        }

        for paragraph in doc.paragraphs.iter().take(LEADING_PARAGRAPHS) {
            if let Some(caps) = SALUTATION.captures(paragraph) {
                push_unique(&mut contributors.recipients, &caps[1]);
            }
        }
        if let Some(caps) = doc.title.as_deref().and_then(|t| LETTER_TO.captures(t)) {
            push_unique(&mut contributors.recipients, &caps[1]);
        }

        for value in doc.meta_values("dc.publisher").iter().chain(doc.meta_values("organization")) {
            for org in value.split(';') {
                push_unique(&mut contributors.organizations, org);
            }
        }

        contributors
    }
}

/// Author slug from `/archive/{slug}/…` or `/history/{etol|erol}/writers/{slug}/…`
fn path_slug(ctx: &SourceContext) -> Option<&str> {
    let segs = &ctx.path_segments;
    let first = segs.first()?.to_ascii_lowercase();
    match first.as_str() {
        "archive" => segs.get(1).map(String::as_str),
        "history" => {
            let sub = segs.get(1)?.to_ascii_lowercase();
            let writers = segs.get(2)?.to_ascii_lowercase();
            if (sub == "etol" || sub == "erol") && writers == "writers" {
                segs.get(3).map(String::as_str)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn from_path(ctx: &SourceContext) -> Option<String> {
    let slug = path_slug(ctx)?.to_ascii_lowercase();
    ctx.known_authors.get(&slug).cloned()
}

fn from_title(title: &str, ctx: &SourceContext) -> Option<Vec<String>> {
    if let Some(caps) = TITLE_BY.captures(title) {
        let names = split_names(&caps[1]);
        if !names.is_empty() {
            return Some(names);
        }
    }

    // `Name: Title` only counts when the name is a known author
    let caps = TITLE_NAME_PREFIX.captures(title)?;
    let candidate = caps[1].trim();
    let last_word = candidate.rsplit(' ').next()?.to_lowercase();
    let known = ctx.known_authors.iter().any(|(slug, display)| {
        display.eq_ignore_ascii_case(candidate) || *slug == last_word
    });
    known.then(|| vec![candidate.to_string()])
}

fn from_body(doc: &ParsedDocument) -> Vec<String> {
    let mut names = Vec::new();
    for text in &doc.author_elements {
        let text = text.strip_prefix("by ").or_else(|| text.strip_prefix("By ")).unwrap_or(text);
        for name in split_names(text) {
            push_unique(&mut names, name);
        }
    }
    for paragraph in doc.paragraphs.iter().take(LEADING_PARAGRAPHS) {
        if let Some(caps) = BYLINE.captures(paragraph) {
            for name in split_names(&caps[1]) {
                push_unique(&mut names, name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ManualOverride;
    use folio_domain::DocumentType;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn known() -> Arc<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        map.insert("marx".to_string(), "Karl Marx".to_string());
        map.insert("lenin".to_string(), "V. I. Lenin".to_string());
        map.insert("cannon".to_string(), "James P. Cannon".to_string());
        Arc::new(map)
    }

    fn markup(body: &str) -> ParsedDocument {
        ParsedDocument::parse(body, DocumentType::Markup, "/archive/unknown/index.htm")
    }

    fn ctx(locator: &str) -> SourceContext {
        SourceContext::from_locator(locator).with_known_authors(known())
    }

    #[test]
    fn test_known_path_slug() {
        let doc = markup("<html><head><title>Capital Vol. I, Chapter 1: Commodities</title></head><body></body></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/archive/marx/works/1867-c1/ch01.htm"));
        assert_eq!(result.value, Some(vec!["Karl Marx".to_string()]));
        assert_eq!(result.source, Some(ProvenanceSource::Path));
        assert_eq!(result.confidence.value(), 1.0);
    }

    #[test]
    fn test_writers_path_in_encyclopedia() {
        let doc = markup("<html><body><p>x</p></body></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/history/etol/writers/cannon/works/1944/x.htm"));
        assert_eq!(result.value, Some(vec!["James P. Cannon".to_string()]));
    }

    #[test]
    fn test_unknown_slug_falls_through_to_title() {
        let doc = markup("<html><head><title>The Mass Strike by Rosa Luxemburg</title></head></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/archive/luxemburg/1906/mass-strike/index.htm"));
        assert_eq!(result.value, Some(vec!["Rosa Luxemburg".to_string()]));
        assert_eq!(result.source, Some(ProvenanceSource::Title));
        assert_eq!(result.confidence.value(), 0.8);
    }

    #[test]
    fn test_title_prefix_requires_known_author() {
        let doc = markup("<html><head><title>Karl Marx: Wage Labour and Capital</title></head></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/reference/misc/x.htm"));
        assert_eq!(result.source, Some(ProvenanceSource::Title));

        let doc = markup("<html><head><title>Economic Manuscripts: Capital</title></head></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/reference/misc/x.htm"));
        assert!(result.is_absent());
    }

    #[test]
    fn test_meta_authors_merge() {
        let doc = markup(r#"<html><head><meta name="author" content="Karl Marx; Frederick Engels"><meta name="DC.Creator" content="Frederick Engels"></head></html>"#);
        let result = AuthorExtractor.extract(&doc, &ctx("/subject/women/index.htm"));
        assert_eq!(
            result.value,
            Some(vec!["Karl Marx".to_string(), "Frederick Engels".to_string()])
        );
        assert_eq!(result.source, Some(ProvenanceSource::EmbeddedMetadata));
        assert_eq!(result.confidence.value(), 0.6);
    }

    #[test]
    fn test_body_byline() {
        let doc = markup("<html><body><p>by Clara Zetkin</p><p>Text.</p></body></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/subject/women/zetkin.htm"));
        assert_eq!(result.value, Some(vec!["Clara Zetkin".to_string()]));
        assert_eq!(result.source, Some(ProvenanceSource::BodyContent));
        assert_eq!(result.confidence.value(), 0.4);
    }

    #[test]
    fn test_manual_short_circuits() {
        let doc = markup(r#"<html><head><meta name="author" content="Someone Else"></head></html>"#);
        let manual = ManualOverride {
            authors: vec!["Frederick Engels".to_string()],
            ..Default::default()
        };
        let result = AuthorExtractor.extract(&doc, &ctx("/archive/marx/works/1880/x.htm").with_manual(manual));
        assert_eq!(result.value, Some(vec!["Frederick Engels".to_string()]));
        assert_eq!(result.source, Some(ProvenanceSource::Manual));
        assert_eq!(result.confidence.value(), 1.0);
    }

    #[test]
    fn test_nothing_found() {
        let doc = markup("<html><body><p>Text without any author.</p></body></html>");
        let result = AuthorExtractor.extract(&doc, &ctx("/subject/women/x.htm"));
        assert_eq!(result, Extraction::absent());
    }

    #[test]
    fn test_contributors() {
        let doc = markup(r#"<html><head><title>Letter to Joseph Weydemeyer</title>
<meta name="DC.Publisher" content="Progress Publishers"></head><body>
<p class="information"><span class="info">Transcription:</span> Zodiac and Brian Baggins</p>
<p>Dear Weydemeyer,</p><p>...</p></body></html>"#);
        let contributors = AuthorExtractor.contributors(&doc);
        assert_eq!(contributors.transcribers, vec!["Zodiac", "Brian Baggins"]);
        assert_eq!(contributors.recipients, vec!["Weydemeyer", "Joseph Weydemeyer"]);
        assert_eq!(contributors.organizations, vec!["Progress Publishers"]);
    }

    #[test]
    fn test_deterministic() {
        let doc = markup(r#"<html><head><meta name="author" content="A. Bebel"></head></html>"#);
        let c = ctx("/reference/x.htm");
        assert_eq!(AuthorExtractor.extract(&doc, &c), AuthorExtractor.extract(&doc, &c));
    }
}
