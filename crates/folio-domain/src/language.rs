//! ISO 639-1 language codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// All ISO 639-1 two-letter codes
const ISO_639_1: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg",
    "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv",
    "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi",
    "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr",
    "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja",
    "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw",
    "ky", "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml",
    "mn", "mr", "ms", "mt", "my", "na", "nb", "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv",
    "ny", "oc", "oj", "om", "or", "os", "pa", "pi", "pl", "ps", "pt", "qu", "rm", "rn", "ro",
    "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr",
    "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr",
    "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi",
    "yo", "za", "zh", "zu",
];

/// Archive language directories and the language they hold
const ARCHIVE_DIRECTORIES: &[(&str, &str)] = &[
    ("arabic", "ar"),
    ("catala", "ca"),
    ("chinese", "zh"),
    ("deutsch", "de"),
    ("espanol", "es"),
    ("farsi", "fa"),
    ("francais", "fr"),
    ("greek", "el"),
    ("italiano", "it"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("polski", "pl"),
    ("portugues", "pt"),
    ("russian", "ru"),
    ("svenska", "sv"),
    ("turkce", "tr"),
];

/// Validated ISO 639-1 language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create a language code
    ///
    /// Accepts upper or lower case and region-qualified tags (`en-GB`),
    /// keeping only the primary subtag.
    ///
    /// # Errors
    /// Returns error if the primary subtag is not an ISO 639-1 code
    pub fn new(value: &str) -> Result<Self, String> {
        let primary = value
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if is_valid(&primary) {
            Ok(Self(primary))
        } else {
            Err(format!("Invalid ISO 639-1 language code: '{}'", value))
        }
    }

    /// English, the archive's default language
    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// Language held by an archive language directory (`deutsch` → `de`)
    pub fn from_archive_directory(segment: &str) -> Option<Self> {
        let segment = segment.to_ascii_lowercase();
        ARCHIVE_DIRECTORIES
            .iter()
            .find(|(dir, _)| *dir == segment)
            .map(|(_, code)| Self((*code).to_string()))
    }

    /// Get the code as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check a bare string against the ISO 639-1 table
pub fn is_valid(code: &str) -> bool {
    code.len() == 2 && ISO_639_1.binary_search(&code).is_ok()
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        let mut sorted = ISO_639_1.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, ISO_639_1);
    }

    #[test]
    fn test_valid_codes() {
        assert_eq!(LanguageCode::new("en").unwrap().as_str(), "en");
        assert_eq!(LanguageCode::new("DE").unwrap().as_str(), "de");
        assert_eq!(LanguageCode::new("en-GB").unwrap().as_str(), "en");
    }

    #[test]
    fn test_invalid_codes() {
        assert!(LanguageCode::new("english").is_err());
        assert!(LanguageCode::new("xx").is_err());
        assert!(LanguageCode::new("").is_err());
    }

    #[test]
    fn test_archive_directories() {
        assert_eq!(LanguageCode::from_archive_directory("deutsch").unwrap().as_str(), "de");
        assert_eq!(LanguageCode::from_archive_directory("Russian").unwrap().as_str(), "ru");
        assert!(LanguageCode::from_archive_directory("archive").is_none());
    }
}
