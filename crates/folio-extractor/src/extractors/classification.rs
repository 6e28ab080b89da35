//! Subject and movement classification from navigation tokens

use super::{path_year, Extraction, FieldExtractor};
use crate::document::{ParsedDocument, SourceContext};
use crate::patterns::YEAR_RANGE;
use folio_domain::record::push_unique;
use folio_domain::{Confidence, ProvenanceSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MATCH_CONFIDENCE: f64 = 0.8;

/// Token → category and token → movement tables
///
/// Tokens are compared lower-cased. Multi-word tokens use `-`
/// (`trade-unions`), matching how they appear in archive paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Token → subject category
    pub categories: BTreeMap<String, String>,

    /// Token → movement
    pub movements: BTreeMap<String, String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let categories = [
            ("capital", "political-economy"),
            ("economics", "political-economy"),
            ("economy", "political-economy"),
            ("political-economy", "political-economy"),
            ("philosophy", "philosophy"),
            ("dialectics", "philosophy"),
            ("history", "history"),
            ("women", "women"),
            ("war", "war"),
            ("imperialism", "imperialism"),
            ("colonialism", "colonialism"),
            ("religion", "religion"),
            ("art", "art"),
            ("literature", "literature"),
            ("science", "science"),
            ("education", "education"),
            ("trade-unions", "trade-unions"),
            ("unions", "trade-unions"),
            ("revolution", "revolution"),
            ("letters", "correspondence"),
            ("correspondence", "correspondence"),
            ("newspapers", "periodicals"),
            ("periodicals", "periodicals"),
        ];
        let movements = [
            ("trotsky", "trotskyism"),
            ("trotskyism", "trotskyism"),
            ("anarchism", "anarchism"),
            ("anarchist", "anarchism"),
            ("comintern", "communism"),
            ("communist", "communism"),
            ("bolshevik", "bolshevism"),
            ("bolsheviks", "bolshevism"),
            ("mao", "maoism"),
            ("maoism", "maoism"),
            ("first-international", "first-international"),
            ("paris-commune", "paris-commune"),
            ("social-democracy", "social-democracy"),
        ];
        Self {
            categories: to_map(&categories),
            movements: to_map(&movements),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Classification of one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Subject categories
    pub subject_categories: Vec<String>,
    /// Movement tags
    pub movements: Vec<String>,
    /// Period label (`1917-1923`, `1860s`)
    pub time_period: Option<String>,
}

impl Classification {
    fn is_empty(&self) -> bool {
        self.subject_categories.is_empty() && self.movements.is_empty() && self.time_period.is_none()
    }
}

/// Classification extractor
#[derive(Debug, Clone, Default)]
pub struct ClassificationExtractor {
    taxonomy: Taxonomy,
}

impl ClassificationExtractor {
    /// Create an extractor over a taxonomy
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    fn apply(&self, token: &str, out: &mut Classification) -> bool {
        let token = token.to_lowercase();
        let mut matched = false;
        if let Some(category) = self.taxonomy.categories.get(&token) {
            push_unique(&mut out.subject_categories, category.as_str());
            matched = true;
        }
        if let Some(movement) = self.taxonomy.movements.get(&token) {
            push_unique(&mut out.movements, movement.as_str());
            matched = true;
        }
        matched
    }

    fn apply_all(&self, text: &str, out: &mut Classification) -> bool {
        let mut matched = false;
        // Whole label first (`trade-unions`), then its parts
        let whole = text.trim().to_lowercase().replace(' ', "-");
        matched |= self.apply(&whole, out);
        for part in text.split(|c: char| !c.is_alphanumeric()).filter(|p| !p.is_empty()) {
            matched |= self.apply(part, out);
        }
        matched
    }
}

impl FieldExtractor for ClassificationExtractor {
    type Output = Classification;

    fn extract(&self, doc: &ParsedDocument, ctx: &SourceContext) -> Extraction<Classification> {
        let mut out = Classification::default();

        let mut from_breadcrumb = false;
        for crumb in &doc.breadcrumb {
            from_breadcrumb |= self.apply_all(&crumb.label, &mut out);
            if out.time_period.is_none() {
                out.time_period = year_range(&crumb.label);
            }
        }

        let segments = &ctx.path_segments;
        let mut from_path = false;
        // The file name is not a navigation token
        let dirs = &segments[..segments.len().saturating_sub(1)];
        for (idx, seg) in dirs.iter().enumerate() {
            from_path |= self.apply_all(seg, &mut out);
            match seg.to_ascii_lowercase().as_str() {
                "etol" if idx > 0 && dirs[idx - 1].eq_ignore_ascii_case("history") => {
                    push_unique(&mut out.movements, "trotskyism");
                    from_path = true;
                }
                "erol" if idx > 0 && dirs[idx - 1].eq_ignore_ascii_case("history") => {
                    push_unique(&mut out.movements, "anti-revisionism");
                    from_path = true;
                }
                "subject" => {
                    if let Some(topic) = dirs.get(idx + 1) {
                        push_unique(&mut out.subject_categories, topic.to_lowercase());
                        from_path = true;
                    }
                }
                _ => {}
            }
        }

        if out.time_period.is_none() {
            out.time_period = path_year(ctx).map(|y| format!("{}s", y - y.rem_euclid(10)));
        }

        if out.is_empty() {
            return Extraction::absent();
        }
        let source = if from_breadcrumb {
            ProvenanceSource::BodyContent
        } else {
            ProvenanceSource::Path
        };
        // A period alone is not a taxonomy match
        let confidence = if from_breadcrumb || from_path {
            Confidence::clamped(MATCH_CONFIDENCE)
        } else {
            Confidence::ZERO
        };
        Extraction::found(out, source, confidence)
    }
}

/// `1917-1923` style period from navigation text
fn year_range(text: &str) -> Option<String> {
    let caps = YEAR_RANGE.captures(text)?;
    let start = &caps[1];
    let end = &caps[2];
    let end = if end.len() < 4 {
        format!("{}{}", &start[..4 - end.len()], end)
    } else {
        end.to_string()
    };
    (end.as_str() >= start).then(|| format!("{}-{}", start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::DocumentType;

    fn doc_with_breadcrumb(labels: &[&str]) -> ParsedDocument {
        let links: String = labels
            .iter()
            .map(|l| format!(r#"<a class="title" href="index.htm">{}</a> | "#, l))
            .collect();
        let html = format!(r#"<html><body><p class="title">{}</p></body></html>"#, links);
        ParsedDocument::parse(html, DocumentType::Markup, "https://www.marxists.org/x/y.htm")
    }

    #[test]
    fn test_breadcrumb_tokens() {
        let doc = doc_with_breadcrumb(&["Subject", "Women", "Trade Unions"]);
        let ctx = SourceContext::from_locator("/reference/x/y.htm");
        let result = ClassificationExtractor::default().extract(&doc, &ctx);
        let value = result.value.unwrap();
        assert_eq!(value.subject_categories, vec!["women", "trade-unions"]);
        assert_eq!(result.source, Some(ProvenanceSource::BodyContent));
        assert_eq!(result.confidence.value(), 0.8);
    }

    #[test]
    fn test_encyclopedia_movements() {
        let doc = doc_with_breadcrumb(&[]);
        let etol = SourceContext::from_locator("/history/etol/writers/cannon/index.htm");
        let value = ClassificationExtractor::default().extract(&doc, &etol).value.unwrap();
        assert!(value.movements.contains(&"trotskyism".to_string()));

        let erol = SourceContext::from_locator("/history/erol/ncm-1/index.htm");
        let result = ClassificationExtractor::default().extract(&doc, &erol);
        assert_eq!(result.source, Some(ProvenanceSource::Path));
        assert!(result.value.unwrap().movements.contains(&"anti-revisionism".to_string()));
    }

    #[test]
    fn test_subject_topic_and_decade() {
        let doc = doc_with_breadcrumb(&[]);
        let ctx = SourceContext::from_locator("/subject/ireland/works/1867/fenians.htm");
        let value = ClassificationExtractor::default().extract(&doc, &ctx).value.unwrap();
        assert!(value.subject_categories.contains(&"ireland".to_string()));
        assert_eq!(value.time_period.as_deref(), Some("1860s"));
    }

    #[test]
    fn test_period_without_token_has_zero_confidence() {
        let doc = doc_with_breadcrumb(&[]);
        let ctx = SourceContext::from_locator("/reference/x/works/1917/y.htm");
        let result = ClassificationExtractor::default().extract(&doc, &ctx);
        assert_eq!(result.value.unwrap().time_period.as_deref(), Some("1910s"));
        assert_eq!(result.confidence.value(), 0.0);
    }

    #[test]
    fn test_breadcrumb_year_range() {
        let doc = doc_with_breadcrumb(&["Lenin Works 1917-23"]);
        let ctx = SourceContext::from_locator("/reference/x/y.htm");
        let value = ClassificationExtractor::default().extract(&doc, &ctx).value.unwrap();
        assert_eq!(value.time_period.as_deref(), Some("1917-1923"));
    }

    #[test]
    fn test_custom_taxonomy() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.movements.insert("syndicalism".to_string(), "syndicalism".to_string());
        let doc = doc_with_breadcrumb(&["Syndicalism"]);
        let ctx = SourceContext::from_locator("/reference/x/y.htm");
        let value = ClassificationExtractor::new(taxonomy).extract(&doc, &ctx).value.unwrap();
        assert_eq!(value.movements, vec!["syndicalism"]);
    }

    #[test]
    fn test_no_tokens() {
        let doc = doc_with_breadcrumb(&["Index"]);
        let ctx = SourceContext::from_locator("/reference/x/y.htm");
        assert!(ClassificationExtractor::default().extract(&doc, &ctx).is_absent());
    }
}
