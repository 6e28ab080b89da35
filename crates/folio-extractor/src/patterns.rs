//! Compiled patterns shared by the analyzer and the extractors

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// `<meta charset=…>` or `content="…; charset=…"` (byte-level)
pub static META_CHARSET: Lazy<regex::bytes::Regex> = Lazy::new(|| {
    regex::bytes::Regex::new(r#"(?i-u)<meta[^>]*charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("valid regex")
});

/// Any element tag
pub static ELEMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*[A-Za-z][A-Za-z0-9]*(?:\s[^>]*)?/?>").expect("valid regex"));

/// First line of a Git LFS pointer file
pub static LFS_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^version https://git-lfs\.github\.com/spec/v1\s*$").expect("valid regex")
});

/// Object id line of a Git LFS pointer file
pub static LFS_OID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^oid sha256:[0-9a-f]{64}\s*$").expect("valid regex"));

/// `<!-- external-storage: … -->` placeholder comment
pub static EXTERNAL_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--\s*external[-_ ]storage\s*:").expect("valid regex"));

/// Labelled provenance line: `Written: March 1917`
pub static PROVENANCE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*(written|first published|published|delivered|source|transcription(?:/markup)?|transcribed by|translated(?: by)?|translation|online version|html markup|proofread|copyleft)\s*:\s*(.*?)\s*$",
    )
    .expect("valid regex")
});

/// Parenthetical date in a title: `(1917)`, `(March 1917)`, `(1848-1850)`
pub static TITLE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([A-Za-z\s.,]*\d{4}(?:\s*[-–]\s*\d{2,4})?)\)").expect("valid regex")
});

/// `… by Name` in a title
pub static TITLE_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[Bb]y\s+(\p{Lu}[\p{L}.'\-]*(?:\s+\p{Lu}[\p{L}.'\-]*){0,4})").expect("valid regex")
});

/// `Name: Title` (two to four capitalised words before the colon)
pub static TITLE_NAME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\p{Lu}[\p{L}.'\-]*(?:\s+\p{Lu}[\p{L}.'\-]*){1,3})\s*:\s+\S").expect("valid regex")
});

/// Byline paragraph: `by Name`
pub static BYLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[Bb]y\s+(\p{Lu}[\p{L}.'\-]*(?:\s+\p{Lu}[\p{L}.'\-]*){0,4})\s*\.?\s*$")
        .expect("valid regex")
});

/// Letter salutation: `Dear Engels,`
pub static SALUTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:My\s+)?(?:[Dd]ear(?:est)?)\s+(?:(?:Comrade|Citizen|Friend|Mr\.?|Mrs\.?|Herr|Frau|Monsieur)\s+)?(\p{Lu}[\p{L}.'\-]*(?:\s+\p{Lu}[\p{L}.'\-]*){0,3})\s*[,!:]",
    )
    .expect("valid regex")
});

/// `Letter to Name` in a title
pub static LETTER_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[Ll]etters?\s+[Tt]o\s+(\p{Lu}[\p{L}.'\-]*(?:\s+\p{Lu}[\p{L}.'\-]*){0,3})")
        .expect("valid regex")
});

/// Year at the start of a path segment: `1867-c1`
pub static LEADING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:$|[^\d])").expect("valid regex"));

/// Chapter file name: `ch01.htm`
pub static CHAPTER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ch(?:apter)?[-_]?0*(\d{1,4})\.x?html?$").expect("valid regex"));

/// Year range in navigation text: `1917-1923`, `1917–23`
pub static YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})\s*[-–]\s*(\d{2,4})\b").expect("valid regex"));

/// Issue numbering that would confuse date parsing: `No. 12`, `Vol. 3`
pub static ISSUE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:no|nr|nos|vol|volume|issue|pp?)\.?\s*\d+(?:\s*[-–]\s*\d+)?").expect("valid regex")
});

/// Words for keyword counting
pub static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+").expect("valid regex"));

/// `<title>`
pub static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));

/// `<h1>`
pub static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));

/// `<h1>`..`<h6>`
pub static HEADINGS: Lazy<[Selector; 6]> = Lazy::new(|| {
    [
        selector("h1"),
        selector("h2"),
        selector("h3"),
        selector("h4"),
        selector("h5"),
        selector("h6"),
    ]
});

/// Any heading
pub static ANY_HEADING: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));

/// `<meta>`
pub static META: Lazy<Selector> = Lazy::new(|| selector("meta"));

/// Links
pub static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// Paragraphs
pub static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| selector("p"));

/// Provenance blocks
pub static INFO_BLOCKS: Lazy<Selector> = Lazy::new(|| selector(".information, .info"));

/// Breadcrumb links
pub static BREADCRUMB: Lazy<Selector> = Lazy::new(|| selector(".title a.title"));

/// Alternative breadcrumb container
pub static BREADCRUMB_FALLBACK: Lazy<Selector> = Lazy::new(|| selector(".breadcrumb a[href]"));

/// Elements naming the author
pub static AUTHOR_CLASS: Lazy<Selector> = Lazy::new(|| selector(".author"));

/// `<body>`
pub static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));

/// Elements carrying an id or class
pub static ID_OR_CLASS: Lazy<Selector> = Lazy::new(|| selector("[id], [class]"));
