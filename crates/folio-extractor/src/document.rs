//! Documents and their extraction context
//!
//! [`RawDocument`] is what the fetch collaborator hands over.
//! [`ParsedDocument`] is the normalized, parsed view every extractor reads.
//! [`SourceContext`] carries everything about a document that is not in
//! its content: locator, path, known authors and manual overrides.

use crate::patterns::{
    AUTHOR_CLASS, BODY, BREADCRUMB, BREADCRUMB_FALLBACK, H1, INFO_BLOCKS, LINKS, META, PARAGRAPHS,
    PROVENANCE_LABEL, TITLE,
};
use folio_domain::{locator, Breadcrumb, DocumentType, IsoDate, LanguageCode, SectionClass};
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Path segments that start the archive tree
const ROOT_SEGMENTS: &[&str] = &["archive", "history", "subject", "glossary", "reference"];

/// Document as supplied by the fetch collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Raw bytes (for PDFs, the text produced by the fetch collaborator)
    pub bytes: Vec<u8>,

    /// URL or file path of the source
    pub locator: String,

    /// Declared encoding, if the transport supplied one
    pub encoding_hint: Option<String>,

    /// Document type override; sniffed when absent
    pub document_type: Option<DocumentType>,
}

impl RawDocument {
    /// Create a raw document without hints
    pub fn new(bytes: impl Into<Vec<u8>>, locator: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            locator: locator.into(),
            encoding_hint: None,
            document_type: None,
        }
    }

    /// Attach an encoding hint
    pub fn with_encoding_hint(mut self, hint: impl Into<String>) -> Self {
        self.encoding_hint = Some(hint.into());
        self
    }

    /// Override the sniffed document type
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Effective document type
    pub fn document_type(&self) -> DocumentType {
        self.document_type
            .unwrap_or_else(|| DocumentType::sniff(&self.bytes, &self.locator))
    }
}

/// Manually curated values for one document
///
/// When present, these are authoritative and short-circuit extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualOverride {
    /// Authors
    pub authors: Vec<String>,
    /// Date written
    pub written_date: Option<IsoDate>,
    /// Date first published
    pub published_date: Option<IsoDate>,
}

/// Date range of the documents surrounding this one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest neighbouring date
    pub start: IsoDate,
    /// Latest neighbouring date
    pub end: IsoDate,
}

/// Everything known about a document besides its content
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    /// Canonical locator of the document
    pub locator: String,

    /// Path segments relative to the archive root
    pub path_segments: Vec<String>,

    /// Known author slugs → display names
    pub known_authors: Arc<BTreeMap<String, String>>,

    /// Manual override entry for this document
    pub manual: Option<ManualOverride>,

    /// Date range of neighbouring documents, for inference
    pub neighbour_dates: Option<DateRange>,
}

impl SourceContext {
    /// Build a context from a locator
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let path_segments = archive_segments(&locator);
        Self {
            locator,
            path_segments,
            ..Self::default()
        }
    }

    /// Set the known author slugs
    pub fn with_known_authors(mut self, known: Arc<BTreeMap<String, String>>) -> Self {
        self.known_authors = known;
        self
    }

    /// Set a manual override entry
    pub fn with_manual(mut self, manual: ManualOverride) -> Self {
        self.manual = Some(manual);
        self
    }

    /// Set the neighbouring date range
    pub fn with_neighbour_dates(mut self, range: DateRange) -> Self {
        self.neighbour_dates = Some(range);
        self
    }

    /// Index of a path segment, compared case-insensitively
    pub fn segment_index(&self, name: &str) -> Option<usize> {
        self.path_segments
            .iter()
            .position(|s| s.eq_ignore_ascii_case(name))
    }

    /// Section the document lives in
    ///
    /// Documents under a language directory (`/deutsch/archiv/…`) count as
    /// archive documents.
    pub fn section(&self) -> Option<SectionClass> {
        SectionClass::from_path_segments(&self.path_segments).or_else(|| {
            self.path_segments
                .first()
                .and_then(|s| LanguageCode::from_archive_directory(s))
                .map(|_| SectionClass::Archive)
        })
    }
}

/// Path segments from the archive root onwards
///
/// File paths from a local mirror carry a prefix (`/data/mia/archive/…`);
/// everything before the first section or language directory is dropped.
pub fn archive_segments(locator: &str) -> Vec<String> {
    let segments = locator::path_segments(locator);
    let start = segments
        .iter()
        .position(|s| {
            let lowered = s.to_ascii_lowercase();
            ROOT_SEGMENTS.contains(&lowered.as_str())
                || LanguageCode::from_archive_directory(&lowered).is_some()
        })
        .unwrap_or(0);
    segments[start..].iter().map(|s| s.to_string()).collect()
}

/// Canonical locator for a document
///
/// URLs are kept as they are; file paths are rebased onto `base_url`.
pub fn canonical_locator(raw: &str, base_url: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return raw.to_string();
    }
    let segments = archive_segments(raw);
    if segments.is_empty() {
        return raw.to_string();
    }
    locator::join(base_url, &segments.join("/"))
}

/// One line of a provenance block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceLine {
    /// Lower-cased label (`written`, `first published`, `source`, …)
    pub label: String,

    /// Text after the label
    pub value: String,

    /// Italic / emphasised fragments of the value (periodical titles)
    pub emphasis: Vec<String>,
}

impl ProvenanceLine {
    /// Split a `Label: value` line
    pub fn parse(text: &str, emphasis: Vec<String>) -> Option<Self> {
        let caps = PROVENANCE_LABEL.captures(text)?;
        let label = collapse_whitespace(&caps[1]).to_lowercase();
        let value = collapse_whitespace(&caps[2]);
        Some(Self {
            label,
            value,
            emphasis,
        })
    }
}

/// A hyperlink found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// `href` as written
    pub href: String,
    /// Link text
    pub text: String,
    /// Target resolved against the document locator; `None` for anchors
    pub resolved: Option<String>,
}

/// Normalized document, parsed once and read by every extractor
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Kind of document
    pub document_type: DocumentType,

    /// Normalized UTF-8 text
    pub text: String,

    /// Parsed markup (markup documents only)
    pub html: Option<Html>,

    /// `<title>` text
    pub title: Option<String>,

    /// Text of every `<h1>`
    pub h1_titles: Vec<String>,

    /// `<meta>` contents by lower-cased name, in document order
    pub meta: BTreeMap<String, Vec<String>>,

    /// `<html lang>` attribute
    pub html_lang: Option<String>,

    /// Number of provenance blocks
    pub provenance_blocks: usize,

    /// Labelled provenance lines
    pub provenance: Vec<ProvenanceLine>,

    /// Navigation trail
    pub breadcrumb: Vec<Breadcrumb>,

    /// Visible body text
    pub body_text: String,

    /// Paragraph texts
    pub paragraphs: Vec<String>,

    /// Hyperlinks
    pub links: Vec<Link>,

    /// Text of elements marked as naming the author
    pub author_elements: Vec<String>,
}

impl ParsedDocument {
    /// Parse normalized text
    pub fn parse(text: impl Into<String>, document_type: DocumentType, locator: &str) -> Self {
        let text = text.into();
        match document_type {
            DocumentType::Markup => Self::parse_markup(text, locator),
            DocumentType::Pdf | DocumentType::PlainText => Self::parse_plain(text, document_type),
        }
    }

    fn parse_markup(text: String, base: &str) -> Self {
        let html = Html::parse_document(&text);

        let title = html
            .select(&TITLE)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let h1_titles: Vec<String> = html
            .select(&H1)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();

        let mut meta: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for el in html.select(&META) {
            let name = el.value().attr("name").or_else(|| el.value().attr("property"));
            if let (Some(name), Some(content)) = (name, el.value().attr("content")) {
                let content = collapse_whitespace(content);
                if !content.is_empty() {
                    meta.entry(name.trim().to_lowercase()).or_default().push(content);
                }
            }
        }

        let html_lang = html
            .root_element()
            .value()
            .attr("lang")
            .or_else(|| html.root_element().value().attr("xml:lang"))
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let paragraphs: Vec<String> = html
            .select(&PARAGRAPHS)
            .map(|el| collapse_whitespace(&visible_text(el)))
            .filter(|p| !p.is_empty())
            .collect();

        let (provenance_blocks, provenance) = provenance_from_markup(&html);

        let mut breadcrumb: Vec<Breadcrumb> = html
            .select(&BREADCRUMB)
            .filter_map(|el| crumb(el, base))
            .collect();
        if breadcrumb.is_empty() {
            breadcrumb = html
                .select(&BREADCRUMB_FALLBACK)
                .filter_map(|el| crumb(el, base))
                .collect();
        }

        let links = html
            .select(&LINKS)
            .filter_map(|el| {
                let href = el.value().attr("href")?.trim().to_string();
                Some(Link {
                    resolved: locator::resolve(base, &href),
                    text: collapse_whitespace(&el.text().collect::<String>()),
                    href,
                })
            })
            .collect();

        let author_elements = html
            .select(&AUTHOR_CLASS)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();

        let body_text = match html.select(&BODY).next() {
            Some(body) => collapse_whitespace(&visible_text(body)),
            None => collapse_whitespace(&visible_text(html.root_element())),
        };

        Self {
            document_type: DocumentType::Markup,
            text,
            html: Some(html),
            title,
            h1_titles,
            meta,
            html_lang,
            provenance_blocks,
            provenance,
            breadcrumb,
            body_text,
            paragraphs,
            links,
            author_elements,
        }
    }

    fn parse_plain(text: String, document_type: DocumentType) -> Self {
        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(collapse_whitespace)
            .filter(|p| !p.is_empty())
            .collect();
        let provenance: Vec<ProvenanceLine> = text
            .lines()
            .filter_map(|line| ProvenanceLine::parse(line, Vec::new()))
            .collect();
        let provenance_blocks = usize::from(!provenance.is_empty());
        let body_text = collapse_whitespace(&text);

        Self {
            document_type,
            html: None,
            title: None,
            h1_titles: Vec::new(),
            meta: BTreeMap::new(),
            html_lang: None,
            provenance_blocks,
            provenance,
            breadcrumb: Vec::new(),
            body_text,
            paragraphs,
            links: Vec::new(),
            author_elements: Vec::new(),
            text,
        }
    }

    /// All values of a meta tag (name compared lower-cased)
    pub fn meta_values(&self, name: &str) -> &[String] {
        self.meta
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Provenance lines carrying one of the given labels
    pub fn provenance_lines<'a>(&'a self, labels: &'a [&'a str]) -> impl Iterator<Item = &'a ProvenanceLine> + 'a {
        self.provenance
            .iter()
            .filter(move |line| labels.contains(&line.label.as_str()))
    }

    /// Document title
    ///
    /// Markup: `<title>`, then the first `<h1>`. PDF and plain text: the
    /// file stem of the locator, title-cased.
    pub fn derive_title(&self, locator: &str) -> Option<String> {
        match self.document_type {
            DocumentType::Markup => self.title.clone().or_else(|| self.h1_titles.first().cloned()),
            DocumentType::Pdf | DocumentType::PlainText => title_from_stem(locator),
        }
    }

    /// Document language: `<html lang>`, the archive language directory, else English
    pub fn derive_language(&self, ctx: &SourceContext) -> LanguageCode {
        if let Some(code) = self.html_lang.as_deref().and_then(|l| LanguageCode::new(l).ok()) {
            return code;
        }
        ctx.path_segments
            .first()
            .and_then(|s| LanguageCode::from_archive_directory(s))
            .unwrap_or_else(LanguageCode::english)
    }
}

fn title_from_stem(locator: &str) -> Option<String> {
    let last = *locator::path_segments(locator).last()?;
    let stem = last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last);
    let title = stem
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    Some(title).filter(|t| !t.is_empty())
}

fn crumb(el: ElementRef<'_>, base: &str) -> Option<Breadcrumb> {
    let label = collapse_whitespace(&el.text().collect::<String>());
    let href = el.value().attr("href")?;
    let locator = locator::resolve(base, href)?;
    if label.is_empty() {
        return None;
    }
    Some(Breadcrumb { label, locator })
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element, skipping scripts and styles
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(el, &mut out);
    out
}

fn push_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                if matches!(e.name(), "script" | "style" | "noscript" | "template") {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let block = is_block(e.name());
                    if block {
                        out.push(' ');
                    }
                    push_visible_text(child_el, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "br" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            | "blockquote" | "table" | "tr" | "td" | "th" | "section" | "article" | "hr"
    )
}

fn has_info_class(el: &ElementRef<'_>) -> bool {
    el.value()
        .classes()
        .any(|c| c.eq_ignore_ascii_case("information") || c.eq_ignore_ascii_case("info"))
}

/// Provenance block count and lines
///
/// Blocks are `.information` / `.info` elements not nested in another
/// block, plus stray paragraphs that start with a provenance label.
fn provenance_from_markup(html: &Html) -> (usize, Vec<ProvenanceLine>) {
    let mut blocks = 0;
    let mut lines = Vec::new();

    for el in html.select(&INFO_BLOCKS) {
        let nested = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| has_info_class(&a));
        if nested {
            continue;
        }
        blocks += 1;
        lines.extend(block_lines(el));
    }

    for p in html.select(&PARAGRAPHS) {
        let inside_block = has_info_class(&p)
            || p.ancestors().filter_map(ElementRef::wrap).any(|a| has_info_class(&a));
        if inside_block {
            continue;
        }
        let found = block_lines(p);
        if !found.is_empty() {
            blocks += 1;
            lines.extend(found);
        }
    }

    (blocks, lines)
}

/// Split a block into `<br>`-separated lines and keep the labelled ones
fn block_lines(el: ElementRef<'_>) -> Vec<ProvenanceLine> {
    let mut raw: Vec<(String, Vec<String>)> = vec![(String::new(), Vec::new())];
    walk_block(el, &mut raw);
    raw.into_iter()
        .filter_map(|(text, emphasis)| ProvenanceLine::parse(&collapse_whitespace(&text), emphasis))
        .collect()
}

fn walk_block(el: ElementRef<'_>, raw: &mut Vec<(String, Vec<String>)>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                if let Some(current) = raw.last_mut() {
                    current.0.push_str(text);
                }
            }
            Node::Element(e) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match e.name() {
                    "br" => raw.push((String::new(), Vec::new())),
                    "em" | "i" | "cite" => {
                        let text = child_el.text().collect::<String>();
                        if let Some(current) = raw.last_mut() {
                            current.0.push_str(&text);
                            let text = collapse_whitespace(&text);
                            if !text.is_empty() {
                                current.1.push(text);
                            }
                        }
                    }
                    "p" | "div" | "li" => {
                        raw.push((String::new(), Vec::new()));
                        walk_block(child_el, raw);
                        raw.push((String::new(), Vec::new()));
                    }
                    _ => walk_block(child_el, raw),
                }
            }
            _ => {}
        }
    }
}
