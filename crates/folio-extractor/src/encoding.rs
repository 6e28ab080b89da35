//! Encoding Normalizer
//!
//! Converts raw document bytes into canonical UTF-8 text and records the
//! encoding the bytes were in. Decision order:
//!
//! 1. Byte order mark
//! 2. External hint supplied by the fetch collaborator
//! 3. Well-formed UTF-8
//! 4. Charset declared in the markup head
//! 5. Statistical detection, accepted only above the configured threshold
//!
//! A hint (external or declared) that does not decode cleanly is not
//! trusted on its own: detection runs, and the hint is only applied with
//! replacement characters when detection is weaker than the threshold.

use crate::error::ExtractorError;
use crate::patterns::META_CHARSET;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

/// How far into the document to look for a charset declaration
const DECLARATION_WINDOW: usize = 1024;

/// Normalized document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Canonical UTF-8 text
    pub text: String,

    /// Encoding the source bytes were in
    pub original_encoding: String,

    /// Whether the output bytes differ from the input bytes
    pub was_normalized: bool,
}

/// Encoding normalizer
#[derive(Debug, Clone, Copy)]
pub struct EncodingNormalizer {
    min_detection_confidence: f64,
}

impl Default for EncodingNormalizer {
    fn default() -> Self {
        Self::new(0.75)
    }
}

impl EncodingNormalizer {
    /// Create a normalizer with a detection threshold
    pub fn new(min_detection_confidence: f64) -> Self {
        Self {
            min_detection_confidence,
        }
    }

    /// Normalize raw bytes into UTF-8
    ///
    /// # Errors
    /// [`ExtractorError::EncodingDetection`] when there is no usable hint
    /// and statistical detection scores below the threshold
    pub fn normalize(&self, bytes: &[u8], hint: Option<&str>) -> Result<NormalizedText, ExtractorError> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            debug!("Encoding from byte order mark: {}", encoding.name());
            return Ok(NormalizedText {
                text: text.into_owned(),
                original_encoding: encoding.name().to_string(),
                was_normalized: true,
            });
        }

        if let Some(label) = hint.map(str::trim).filter(|l| !l.is_empty()) {
            match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => return self.apply_hint(bytes, label, encoding),
                None => warn!("Ignoring unknown encoding hint '{}'", label),
            }
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok(NormalizedText {
                text: text.to_string(),
                original_encoding: encoding_rs::UTF_8.name().to_string(),
                was_normalized: false,
            });
        }

        if let Some(label) = declared_charset(bytes) {
            match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => {
                    debug!("Using declared charset '{}'", label);
                    return self.apply_hint(bytes, &label, encoding);
                }
                None => warn!("Ignoring unknown declared charset '{}'", label),
            }
        }

        let (detected, score) = detect(bytes);
        if score >= self.min_detection_confidence {
            debug!(
                "Detected encoding {} (plausibility {:.2})",
                detected.original_encoding, score
            );
            return Ok(detected);
        }

        Err(ExtractorError::EncodingDetection {
            confidence: score,
            threshold: self.min_detection_confidence,
        })
    }

    fn apply_hint(
        &self,
        bytes: &[u8],
        label: &str,
        encoding: &'static Encoding,
    ) -> Result<NormalizedText, ExtractorError> {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if !had_errors {
            let was_normalized = text.as_bytes() != bytes;
            return Ok(NormalizedText {
                text: text.into_owned(),
                original_encoding: label.to_uppercase(),
                was_normalized,
            });
        }

        let (detected, score) = detect(bytes);
        if score >= self.min_detection_confidence {
            warn!(
                "Hint '{}' does not decode cleanly, using detected {} (plausibility {:.2})",
                label, detected.original_encoding, score
            );
            return Ok(detected);
        }

        warn!("Hint '{}' does not decode cleanly, applying with replacement", label);
        Ok(NormalizedText {
            text: text.into_owned(),
            original_encoding: label.to_uppercase(),
            was_normalized: true,
        })
    }
}

fn detect(bytes: &[u8]) -> (NormalizedText, f64) {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    let score = plausibility(&text);
    let detected = NormalizedText {
        text: text.into_owned(),
        original_encoding: encoding.name().to_string(),
        was_normalized: true,
    };
    (detected, score)
}

/// Charset named by a `<meta>` declaration near the top of the document
pub fn declared_charset(bytes: &[u8]) -> Option<String> {
    let window = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    META_CHARSET
        .captures(window)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}

/// How much decoded text looks like natural-language prose, in [0.0, 1.0]
///
/// Letters, digits, whitespace and common punctuation count towards the
/// score; control characters and U+FFFD count double against it.
pub fn plausibility(text: &str) -> f64 {
    let mut total = 0usize;
    let mut good = 0usize;
    let mut bad = 0usize;

    for c in text.chars() {
        total += 1;
        if c == '\u{FFFD}' || (c.is_control() && !matches!(c, '\t' | '\n' | '\r')) {
            bad += 1;
        } else if c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation() || is_typographic(c) {
            good += 1;
        }
    }

    if total == 0 {
        return 1.0;
    }
    let score = (good as f64 - 2.0 * bad as f64) / total as f64;
    score.clamp(0.0, 1.0)
}

fn is_typographic(c: char) -> bool {
    matches!(
        c,
        '\u{2010}'..='\u{2027}' | '\u{00A7}' | '\u{00AB}' | '\u{00BB}' | '\u{00B7}' | '\u{00B0}'
    )
}
