//! Source locators (URLs or archive paths)
//!
//! Locators are either absolute `http(s)` URLs or slash-delimited paths.
//! Only the shape is checked; nothing here touches the network.

/// Check that a locator is well-formed
///
/// Accepts `http://` / `https://` URLs with a non-empty host, and
/// absolute or relative paths. Whitespace and control characters are
/// rejected everywhere.
pub fn is_well_formed(locator: &str) -> bool {
    if locator.is_empty() || locator.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    match split_origin(locator) {
        Some((origin, _)) => {
            let host = origin.split("://").nth(1).unwrap_or("");
            !host.is_empty() && !host.starts_with(':')
        }
        None => !locator.contains("://"),
    }
}

/// Path segments of a locator, without origin, query or fragment
///
/// ```
/// use folio_domain::locator::path_segments;
///
/// let segs = path_segments("https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm#S1");
/// assert_eq!(segs, vec!["archive", "marx", "works", "1867-c1", "ch01.htm"]);
/// ```
pub fn path_segments(locator: &str) -> Vec<&str> {
    let path = match split_origin(locator) {
        Some((_, path)) => path,
        None => locator,
    };
    strip_suffixes(path)
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Resolve an href found in a document against the document's locator
///
/// Returns `None` for in-document anchors and non-navigational schemes
/// (`mailto:`, `javascript:`, `ftp://`). The fragment is dropped from the
/// result. Embedded whitespace is percent-encoded, so every returned
/// locator passes [`is_well_formed`]; anything that still would not is
/// dropped.
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("mailto:") || lowered.starts_with("javascript:") || lowered.starts_with("data:") {
        return None;
    }
    let resolved = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        strip_fragment(href).to_string()
    } else if lowered.contains("://") {
        return None;
    } else {
        resolve_relative(base, href)?
    };

    let encoded = percent_encode_whitespace(&resolved);
    is_well_formed(&encoded).then_some(encoded)
}

fn resolve_relative(base: &str, href: &str) -> Option<String> {
    let (origin, base_path) = match split_origin(base) {
        Some((origin, path)) => (origin, path),
        None => ("", base),
    };

    let mut segments: Vec<&str> = if href.starts_with('/') {
        Vec::new()
    } else {
        // Directory of the base document
        let mut segs: Vec<&str> = strip_suffixes(base_path)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        if !base_path.ends_with('/') {
            segs.pop();
        }
        segs
    };

    for part in strip_suffixes(href).split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return None;
    }

    let leading = if origin.is_empty() && !base_path.starts_with('/') && !href.starts_with('/') {
        ""
    } else {
        "/"
    };
    Some(format!("{}{}{}", origin, leading, segments.join("/")))
}

/// Percent-encode whitespace and control characters
fn percent_encode_whitespace(locator: &str) -> String {
    let mut out = String::with_capacity(locator.len());
    for c in locator.chars() {
        if c.is_whitespace() || c.is_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Join an archive-relative path onto a base URL
pub fn join(base_url: &str, relative: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let rel = relative.replace('\\', "/");
    let rel = rel.trim_start_matches('/');
    format!("{}/{}", base, rel)
}

/// Split `scheme://host` from the rest of an absolute URL
fn split_origin(locator: &str) -> Option<(&str, &str)> {
    let lowered = locator.get(..8).unwrap_or(locator).to_ascii_lowercase();
    let scheme_len = if lowered.starts_with("https://") {
        8
    } else if lowered.starts_with("http://") {
        7
    } else {
        return None;
    };
    let rest = &locator[scheme_len..];
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some((&locator[..scheme_len + host_end], &rest[host_end..]))
}

fn strip_fragment(s: &str) -> &str {
    s.split('#').next().unwrap_or(s)
}

fn strip_suffixes(s: &str) -> &str {
    let s = strip_fragment(s);
    s.split('?').next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_urls_and_paths() {
        assert!(is_well_formed("https://www.marxists.org/archive/marx/index.htm"));
        assert!(is_well_formed("/archive/lenin/works/1917/staterev/index.htm"));
        assert!(is_well_formed("../index.htm"));
    }

    #[test]
    fn test_malformed_locators() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("https://"));
        assert!(!is_well_formed("/archive/marx/some file.htm"));
        assert!(!is_well_formed("ftp://example.org/file"));
    }

    #[test]
    fn test_path_segments_of_relative_path() {
        assert_eq!(
            path_segments("archive/lenin/works/1917/staterev/ch01.htm"),
            vec!["archive", "lenin", "works", "1917", "staterev", "ch01.htm"]
        );
    }

    #[test]
    fn test_resolve_relative_href() {
        let base = "https://www.marxists.org/archive/marx/works/1867-c1/ch01.htm";
        assert_eq!(
            resolve(base, "ch02.htm").unwrap(),
            "https://www.marxists.org/archive/marx/works/1867-c1/ch02.htm"
        );
        assert_eq!(
            resolve(base, "../../index.htm#top").unwrap(),
            "https://www.marxists.org/archive/marx/index.htm"
        );
        assert_eq!(
            resolve(base, "/glossary/index.htm").unwrap(),
            "https://www.marxists.org/glossary/index.htm"
        );
    }

    #[test]
    fn test_resolve_skips_anchors_and_mail() {
        let base = "https://www.marxists.org/archive/marx/index.htm";
        assert!(resolve(base, "#s1").is_none());
        assert!(resolve(base, "mailto:admin@marxists.org").is_none());
    }

    #[test]
    fn test_resolve_encodes_spaces_in_archive_filenames() {
        let base = "https://www.marxists.org/archive/marx/works/1868/letters/index.htm";
        let resolved = resolve(base, "68 01 08.htm").unwrap();
        assert_eq!(
            resolved,
            "https://www.marxists.org/archive/marx/works/1868/letters/68%2001%2008.htm"
        );
        assert!(is_well_formed(&resolved));
        assert!(is_well_formed(&resolve(base, "http://example.org/a b.htm").unwrap()));
    }

    #[test]
    fn test_resolve_drops_other_schemes() {
        let base = "https://www.marxists.org/archive/marx/index.htm";
        assert!(resolve(base, "ftp://example.org/file").is_none());
        assert!(resolve("https://", "https://").is_none());
    }

    #[test]
    fn test_join_base_url() {
        assert_eq!(
            join("https://www.marxists.org/", "/archive/marx/index.htm"),
            "https://www.marxists.org/archive/marx/index.htm"
        );
    }
}
