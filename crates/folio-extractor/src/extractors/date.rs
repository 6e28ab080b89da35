//! Date extraction
//!
//! The written date comes from the first source that yields one: manual
//! override, path year, title parenthetical, provenance block, meta tags,
//! then inference from neighbouring documents. The published date is
//! read from the provenance block (or the manual override) on its own and
//! never replaces the written date.

use super::{path_year, Extraction, FieldExtractor};
use crate::document::{DateRange, ParsedDocument, SourceContext};
use crate::patterns::TITLE_DATE;
use folio_domain::{Confidence, IsoDate, ProvenanceSource};

const TITLE_CONFIDENCE: f64 = 0.8;
const KEYWORD_BLOCK_CONFIDENCE: f64 = 0.6;
const METADATA_CONFIDENCE: f64 = 0.4;

/// Inferred dates never score above this
pub const INFERRED_CEILING: f64 = 0.5;
const INFERRED_WIDE_RANGE: f64 = 0.25;

const WRITTEN_LABELS: &[&str] = &["written", "delivered"];
const PUBLISHED_LABELS: &[&str] = &["first published", "published"];

/// Written and published dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dates {
    /// When the work was written
    pub written: Option<IsoDate>,
    /// When the work was first published
    pub published: Option<IsoDate>,
}

/// Date extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor;

impl FieldExtractor for DateExtractor {
    type Output = Dates;

    fn extract(&self, doc: &ParsedDocument, ctx: &SourceContext) -> Extraction<Dates> {
        if let Some(manual) = &ctx.manual {
            if manual.written_date.is_some() || manual.published_date.is_some() {
                let dates = Dates {
                    written: manual.written_date,
                    published: manual.published_date,
                };
                return Extraction::found(dates, ProvenanceSource::Manual, Confidence::FULL);
            }
        }

        let published = first_loose(doc, PUBLISHED_LABELS);

        let written = path_year(ctx)
            .map(|y| (IsoDate::Year(y), ProvenanceSource::Path, Confidence::FULL))
            .or_else(|| {
                title_date(doc)
                    .map(|d| (d, ProvenanceSource::Title, Confidence::clamped(TITLE_CONFIDENCE)))
            })
            .or_else(|| {
                first_loose(doc, WRITTEN_LABELS).map(|d| {
                    (d, ProvenanceSource::KeywordBlock, Confidence::clamped(KEYWORD_BLOCK_CONFIDENCE))
                })
            })
            .or_else(|| {
                meta_date(doc).map(|d| {
                    (d, ProvenanceSource::EmbeddedMetadata, Confidence::clamped(METADATA_CONFIDENCE))
                })
            });

        match (written, published) {
            (Some((date, source, confidence)), published) => Extraction::found(
                Dates {
                    written: Some(date),
                    published,
                },
                source,
                confidence,
            ),
            (None, Some(published)) => Extraction::found(
                Dates {
                    written: None,
                    published: Some(published),
                },
                ProvenanceSource::KeywordBlock,
                Confidence::clamped(KEYWORD_BLOCK_CONFIDENCE),
            ),
            (None, None) => match ctx.neighbour_dates.and_then(infer) {
                Some((date, confidence)) => Extraction::found(
                    Dates {
                        written: Some(date),
                        published: None,
                    },
                    ProvenanceSource::Inferred,
                    confidence,
                ),
                None => Extraction::absent(),
            },
        }
    }
}

fn title_date(doc: &ParsedDocument) -> Option<IsoDate> {
    let title = doc.title.as_deref().or(doc.h1_titles.first().map(String::as_str))?;
    TITLE_DATE
        .captures(title)
        .and_then(|caps| range_start(&caps[1]))
}

fn first_loose(doc: &ParsedDocument, labels: &[&str]) -> Option<IsoDate> {
    doc.provenance_lines(labels)
        .find_map(|line| range_start(&line.value))
}

fn meta_date(doc: &ParsedDocument) -> Option<IsoDate> {
    doc.meta_values("date")
        .iter()
        .chain(doc.meta_values("dc.date"))
        .find_map(|v| IsoDate::parse_iso(v.trim()).ok().or_else(|| IsoDate::parse_loose(v)))
}

/// Read a date, or the start of a prose range ("December 1847-January 1848")
pub fn range_start(text: &str) -> Option<IsoDate> {
    if let Some(date) = IsoDate::parse_loose(text) {
        return Some(date);
    }
    let head = text
        .split(['–', '—'])
        .next()
        .and_then(|h| h.split(" to ").next())?;
    if let Some(date) = IsoDate::parse_loose(head) {
        return Some(date);
    }
    // `December 1847-January 1848`: split on a hyphen between a year and a word
    let (head, _) = text.split_once('-')?;
    IsoDate::parse_loose(head)
}

/// Midpoint of a neighbouring date range, at year precision
fn infer(range: DateRange) -> Option<(IsoDate, Confidence)> {
    let (a, b) = (range.start.first_day()?, range.end.first_day()?);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let midpoint = start + (end - start) / 2;
    let span_years = (range.end.year() - range.start.year()).abs();
    let confidence = if span_years <= 1 {
        INFERRED_CEILING
    } else {
        INFERRED_WIDE_RANGE
    };
    let confidence = Confidence::clamped(confidence).capped_at(Confidence::clamped(INFERRED_CEILING));
    Some((IsoDate::Year(IsoDate::Day(midpoint).year()), confidence))
}
