//! URL scheme checks for URL-bearing attributes and CSS `url()`

use std::collections::HashSet;

/// Schemes allowed when none are configured
pub const DEFAULT_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Extract the scheme of an already-decoded URL, lowercased.
///
/// Whitespace and control characters are skipped, so `jav\tascript:` yields
/// `javascript`. Returns None for relative URLs, i.e. when '/', '?' or '#'
/// comes before any ':'.
pub fn scheme(url: &str) -> Option<String> {
    let mut scheme = String::new();
    for c in url.chars() {
        match c {
            ':' => return Some(scheme.to_ascii_lowercase()),
            '/' | '?' | '#' => return None,
            c if c.is_whitespace() || c.is_control() => {}
            c => scheme.push(c),
        }
    }
    None
}

/// Check a decoded URL against the allowed schemes. Relative URLs pass.
pub fn is_allowed_url(url: &str, protocols: &HashSet<String>) -> bool {
    match scheme(url) {
        Some(s) => protocols.contains(&s),
        None => true,
    }
}

/// Build a scheme set from names
pub fn protocol_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().to_ascii_lowercase())
        .collect()
}
