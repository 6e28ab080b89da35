//! Content fingerprints

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex length of a full SHA-256 fingerprint
pub const FULL_LEN: usize = 64;

/// Hex length of the truncated fingerprints carried by legacy records
pub const LEGACY_LEN: usize = 16;

/// Stable fingerprint of a document's normalized content
///
/// Always computed from the normalized bytes on the extraction path; the
/// only other way in is [`ContentFingerprint::from_hex`], used when
/// decoding stored records or migrating legacy ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Fingerprint normalized content
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::ContentFingerprint;
    ///
    /// let fp = ContentFingerprint::of(b"Capital");
    /// assert_eq!(fp.as_str().len(), 64);
    /// assert_eq!(fp, ContentFingerprint::of(b"Capital"));
    /// ```
    pub fn of(normalized: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(normalized)))
    }

    /// Parse a stored fingerprint (full or legacy length, lowercase hex)
    pub fn from_hex(s: &str) -> Result<Self, String> {
        if is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("Invalid content fingerprint: '{}'", s))
        }
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a truncated legacy fingerprint
    pub fn is_legacy(&self) -> bool {
        self.0.len() == LEGACY_LEN
    }
}

/// Check fingerprint format: lowercase hex of full or legacy length
pub fn is_well_formed(s: &str) -> bool {
    (s.len() == FULL_LEN || s.len() == LEGACY_LEN)
        && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentFingerprint> for String {
    fn from(fp: ContentFingerprint) -> Self {
        fp.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let fp = ContentFingerprint::of(b"");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(!fp.is_legacy());
    }

    #[test]
    fn test_changes_with_content() {
        assert_ne!(ContentFingerprint::of(b"a"), ContentFingerprint::of(b"b"));
    }

    #[test]
    fn test_from_hex() {
        assert!(ContentFingerprint::from_hex("0123456789abcdef").unwrap().is_legacy());
        assert!(ContentFingerprint::from_hex("0123456789ABCDEF").is_err());
        assert!(ContentFingerprint::from_hex("abc").is_err());
        assert!(ContentFingerprint::from_hex("zzzzzzzzzzzzzzzz").is_err());
    }
}
