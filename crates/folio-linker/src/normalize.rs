//! Name normalization for matching

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a name for comparison
///
/// NFKD decomposition, combining marks removed, lower-cased, whitespace
/// collapsed. `"  Jaurès,  Jean "` becomes `"jaures, jean"`.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_name("Jaurès"), "jaures");
        assert_eq!(normalize_name("Rákosi Mátyás"), "rakosi matyas");
    }

    #[test]
    fn test_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  Karl \t  MARX\n"), "karl marx");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_compatibility_forms() {
        // U+FB01 LATIN SMALL LIGATURE FI
        assert_eq!(normalize_name("\u{FB01}sher"), "fisher");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_name("Pléchanoff  G.");
        assert_eq!(normalize_name(&once), once);
    }
}
