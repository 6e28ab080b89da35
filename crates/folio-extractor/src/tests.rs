//! Cross-module tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{
        EncodingNormalizer, ExtractorConfig, ExtractorSet, ParsedDocument, RawDocument,
        SourceContext, StructuralAnalyzer,
    };
    use folio_domain::{DocumentType, ProvenanceSource, SectionClass};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const CAPITAL_CH01: &str = r#"<html lang="en"><head>
<meta charset="utf-8">
<title>Capital Vol. I, Chapter 1: Commodities</title>
</head><body>
<p class="title"><a class="title" href="../index.htm">Marx/Engels Works</a> |
<a class="title" href="index.htm">Capital Volume I</a></p>
<h1>Chapter 1: Commodities</h1>
<p class="information"><span class="info">Written:</span> 1867;<br>
<span class="info">Source:</span> <em>Capital</em> Volume I, Progress Publishers</p>
<p>The wealth of those societies in which the capitalist mode of production prevails, presents itself as an immense accumulation of commodities.</p>
<p><a href="ch02.htm">Chapter 2</a></p>
</body></html>"#;

    const LOCATOR: &str = "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm";

    fn known_authors() -> Arc<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        map.insert("marx".to_string(), "Karl Marx".to_string());
        Arc::new(map)
    }

    #[test]
    fn test_utf8_chapter_end_to_end() {
        let raw = RawDocument::new(CAPITAL_CH01.as_bytes(), LOCATOR);
        let normalized = EncodingNormalizer::default()
            .normalize(&raw.bytes, raw.encoding_hint.as_deref())
            .unwrap();
        assert!(!normalized.was_normalized);
        assert_eq!(normalized.original_encoding, "UTF-8");

        let doc = ParsedDocument::parse(normalized.text, raw.document_type(), &raw.locator);
        let ctx = SourceContext::from_locator(LOCATOR).with_known_authors(known_authors());
        assert_eq!(ctx.section(), Some(SectionClass::Archive));
        assert_eq!(doc.derive_language(&ctx).as_str(), "en");

        let findings = ExtractorSet::new(&ExtractorConfig::default()).run(&doc, &ctx);
        assert_eq!(findings.authors.value, Some(vec!["Karl Marx".to_string()]));
        assert_eq!(findings.authors.source, Some(ProvenanceSource::Path));
        assert_eq!(findings.authors.confidence.value(), 1.0);
        assert_eq!(findings.semantic.chapter_number, Some(1));
        assert_eq!(findings.semantic.breadcrumb.len(), 2);
        assert_eq!(findings.semantic.source_periodical.as_deref(), Some("Capital"));

        let report = StructuralAnalyzer::default().analyze_document(&doc).unwrap();
        assert_eq!(report.heading_counts["h1"], 1);
        assert!(!report.degraded);
    }

    #[test]
    fn test_latin1_hint_normalizes_once() {
        let mut bytes = b"<html><head><title>Das Kapital</title></head><body><p>Die Ware: ".to_vec();
        bytes.extend_from_slice(&[0x47, 0x65, 0x62, 0x72, 0xE4, 0x75, 0x63, 0x68]); // "Gebräuch"
        bytes.extend_from_slice(b"swert</p></body></html>");
        let raw = RawDocument::new(bytes, LOCATOR).with_encoding_hint("ISO-8859-1");

        let normalizer = EncodingNormalizer::default();
        let first = normalizer.normalize(&raw.bytes, raw.encoding_hint.as_deref()).unwrap();
        assert!(first.was_normalized);
        assert_eq!(first.original_encoding, "ISO-8859-1");
        assert!(first.text.contains("Gebräuchswert"));

        let second = normalizer.normalize(first.text.as_bytes(), None).unwrap();
        assert_eq!(second.text.as_bytes(), first.text.as_bytes());
        assert!(!second.was_normalized);
    }

    #[test]
    fn test_plain_text_has_no_structure() {
        let text = "Written: 1917\n\nThe question of the state is acquiring particular importance.";
        let locator = "/archive/lenin/works/1917/staterev/staterev.txt";
        let raw = RawDocument::new(text.as_bytes(), locator);
        assert_eq!(raw.document_type(), DocumentType::PlainText);

        let doc = ParsedDocument::parse(text, raw.document_type(), locator);
        assert!(StructuralAnalyzer::default().analyze_document(&doc).is_none());
        let findings = ExtractorSet::default().run(&doc, &SourceContext::from_locator(locator));
        assert_eq!(findings.dates.source, Some(ProvenanceSource::Path));
        assert!(findings.authors.is_absent());
    }

    proptest! {
        #[test]
        fn prop_confidences_in_unit_interval(title in "[A-Za-z ]{0,40}", body in "[A-Za-z ,.]{0,200}") {
            let html = format!("<html><head><title>{}</title></head><body><p>{}</p></body></html>", title, body);
            let doc = ParsedDocument::parse(html, DocumentType::Markup, LOCATOR);
            let findings = ExtractorSet::default().run(&doc, &SourceContext::from_locator(LOCATOR));
            for confidence in [
                findings.authors.confidence,
                findings.dates.confidence,
                findings.classification.confidence,
                findings.keywords.confidence,
            ] {
                prop_assert!((0.0..=1.0).contains(&confidence.value()));
            }
        }

        #[test]
        fn prop_normalization_is_idempotent(text in "\\PC{0,200}") {
            let normalizer = EncodingNormalizer::default();
            let once = normalizer.normalize(text.as_bytes(), None).unwrap();
            let twice = normalizer.normalize(once.text.as_bytes(), None).unwrap();
            prop_assert_eq!(once.text, twice.text);
            prop_assert!(!twice.was_normalized);
        }

        #[test]
        fn prop_extraction_is_deterministic(body in "[A-Za-z ]{0,200}") {
            let html = format!("<html><body><p>by Rosa Luxemburg</p><p>{}</p></body></html>", body);
            let doc = ParsedDocument::parse(html, DocumentType::Markup, LOCATOR);
            let ctx = SourceContext::from_locator(LOCATOR);
            let set = ExtractorSet::default();
            prop_assert_eq!(set.run(&doc, &ctx), set.run(&doc, &ctx));
        }
    }
}
