//! Keywords, description and navigation fields

use super::date::range_start;
use super::{Extraction, FieldExtractor};
use crate::document::{ParsedDocument, SourceContext};
use crate::patterns::{CHAPTER_FILE, ISSUE_NUMBER, LEADING_YEAR, WORD};
use folio_domain::record::push_unique;
use folio_domain::{locator, Breadcrumb, Confidence, IsoDate, ProvenanceSource};
use std::collections::BTreeMap;

const METADATA_CONFIDENCE: f64 = 0.8;
const FREQUENCY_CONFIDENCE: f64 = 0.4;
const MIN_WORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "against", "also", "because", "been", "before", "being", "between",
    "both", "but", "could", "does", "doing", "down", "during", "each", "even", "every", "from",
    "further", "have", "having", "here", "into", "itself", "just", "like", "made", "make", "many",
    "more", "most", "much", "must", "only", "other", "over", "same", "shall", "should", "some",
    "such", "than", "that", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "under", "until", "upon", "very", "were", "what", "when",
    "where", "which", "while", "whom", "will", "with", "would", "your", "yours",
];

const SOURCE_LABELS: &[&str] = &["source", "first published", "published"];

/// Semantic fields besides keywords
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SemanticFindings {
    /// Short description
    pub description: Option<String>,
    /// Resolved targets of non-glossary links
    pub cross_references: Vec<String>,
    /// Glossary entries the document links to
    pub linked_entities: Vec<String>,
    /// Navigation trail
    pub breadcrumb: Vec<Breadcrumb>,
    /// Collection path (`archive/marx/works`)
    pub collection_id: Option<String>,
    /// Work identifier from the path
    pub work_id: Option<String>,
    /// Chapter number from the file name
    pub chapter_number: Option<u32>,
    /// Periodical of first publication
    pub source_periodical: Option<String>,
    /// Issue date of that periodical
    pub issue_date: Option<IsoDate>,
}

/// Semantic extractor
///
/// [`FieldExtractor::extract`] yields keywords; [`SemanticExtractor::findings`]
/// the rest of the semantic layer.
#[derive(Debug, Clone)]
pub struct SemanticExtractor {
    max_keywords: usize,
    description_max_chars: usize,
}

impl Default for SemanticExtractor {
    fn default() -> Self {
        Self::new(10, 280)
    }
}

impl SemanticExtractor {
    /// Create an extractor with keyword and description limits
    pub fn new(max_keywords: usize, description_max_chars: usize) -> Self {
        Self {
            max_keywords,
            description_max_chars,
        }
    }

    /// Description, links, breadcrumb and path-derived identifiers
    pub fn findings(&self, doc: &ParsedDocument, ctx: &SourceContext) -> SemanticFindings {
        let description = doc
            .meta_values("description")
            .first()
            .or_else(|| doc.meta_values("dc.description").first())
            .cloned()
            .or_else(|| doc.paragraphs.iter().find(|p| p.len() > 40).cloned())
            .map(|text| truncate_words(&text, self.description_max_chars));

        let mut cross_references = Vec::new();
        let mut linked_entities = Vec::new();
        for link in &doc.links {
            let Some(target) = &link.resolved else {
                continue;
            };
            match glossary_entity(target, &link.href) {
                Some(entity) => {
                    push_unique(&mut linked_entities, entity);
                }
                None => {
                    push_unique(&mut cross_references, target.as_str());
                }
            }
        }

        let (source_periodical, issue_date) = periodical(doc);

        SemanticFindings {
            description,
            cross_references,
            linked_entities,
            breadcrumb: doc.breadcrumb.clone(),
            collection_id: collection_id(ctx),
            work_id: work_id(ctx),
            chapter_number: chapter_number(ctx),
            source_periodical,
            issue_date,
        }
    }

    fn frequency_keywords(&self, body: &str) -> Vec<String> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for word in WORD.find_iter(body) {
            let word = word.as_str().to_lowercase();
            if word.chars().count() < MIN_WORD_LEN || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_default() += 1;
        }
        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        // BTreeMap order makes ties alphabetical; the sort is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, _)| word)
            .collect()
    }
}

impl FieldExtractor for SemanticExtractor {
    type Output = Vec<String>;

    fn extract(&self, doc: &ParsedDocument, _ctx: &SourceContext) -> Extraction<Vec<String>> {
        let mut keywords = Vec::new();
        for value in doc.meta_values("keywords").iter().chain(doc.meta_values("dc.subject")) {
            for keyword in value.split([',', ';']) {
                if keywords.len() >= self.max_keywords {
                    break;
                }
                push_unique(&mut keywords, keyword.trim().to_lowercase());
            }
        }
        if !keywords.is_empty() {
            return Extraction::found(
                keywords,
                ProvenanceSource::EmbeddedMetadata,
                Confidence::clamped(METADATA_CONFIDENCE),
            );
        }

        let keywords = self.frequency_keywords(&doc.body_text);
        if keywords.is_empty() {
            return Extraction::absent();
        }
        Extraction::found(
            keywords,
            ProvenanceSource::BodyContent,
            Confidence::clamped(FREQUENCY_CONFIDENCE),
        )
    }
}

/// Cut text at a word boundary, adding an ellipsis when shortened
fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = if out.is_empty() { word.chars().count() } else { out.chars().count() + 1 + word.chars().count() };
        if needed + 1 > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        out = text.chars().take(max_chars.saturating_sub(1)).collect();
    }
    out.push('…');
    out
}

/// Glossary entity named by a link: the fragment, else the file stem
fn glossary_entity(target: &str, href: &str) -> Option<String> {
    let segments = locator::path_segments(target);
    if !segments.iter().any(|s| s.eq_ignore_ascii_case("glossary")) {
        return None;
    }
    if let Some((_, fragment)) = href.split_once('#') {
        if !fragment.trim().is_empty() {
            return Some(fragment.trim().to_string());
        }
    }
    let last = segments.last()?;
    let stem = last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last);
    Some(stem.to_string()).filter(|s| !s.is_empty() && s != "index")
}

fn collection_id(ctx: &SourceContext) -> Option<String> {
    let idx = ctx.segment_index("works")?;
    Some(ctx.path_segments[..=idx].join("/"))
}

/// The directory after the year segment, else the year segment itself
fn work_id(ctx: &SourceContext) -> Option<String> {
    let segments = &ctx.path_segments;
    let dirs = &segments[..segments.len().saturating_sub(1)];
    let year_idx = dirs.iter().position(|s| LEADING_YEAR.is_match(s))?;
    Some(dirs.get(year_idx + 1).unwrap_or(&dirs[year_idx]).clone())
}

fn chapter_number(ctx: &SourceContext) -> Option<u32> {
    let file = ctx.path_segments.last()?;
    CHAPTER_FILE
        .captures(file)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Periodical title (first emphasised fragment) and issue date
fn periodical(doc: &ParsedDocument) -> (Option<String>, Option<IsoDate>) {
    for line in doc.provenance_lines(SOURCE_LABELS) {
        let Some(title) = line.emphasis.first() else {
            continue;
        };
        let rest = line.value.replacen(title.as_str(), "", 1);
        let rest = ISSUE_NUMBER.replace_all(&rest, "");
        let rest = rest.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '.');
        return (Some(title.clone()), range_start(rest));
    }
    (None, None)
}
