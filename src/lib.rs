//! RustySanitizer - Allow-list HTML and inline CSS sanitizer
//!
//! Untrusted markup is tokenized leniently, filtered against an allow-list
//! and re-serialized with every text and attribute value escaped.
//!
//! Entry points:
//! - `sanitize`: one fragment against a `Config`
//! - `Sanitizer`: strip-all / allow-list / no-links flavors with per-call options
//! - `sanitize_css`: standalone `style` value filter
//! - `strategy::parallel`: rayon batch sanitization
//! - `SanitizerCache`: resolved option sets kept across calls

pub mod cache;
pub mod core;
pub mod css;
pub mod error;
pub mod options;
pub mod policy;
pub mod sanitizer;
pub mod serializer;
pub mod strategy;

use std::borrow::Cow;
use std::sync::LazyLock;

use crate::core::tokenizer::Tokenizer;
use policy::PolicyEngine;
use serializer::HtmlSerializer;

pub use cache::SanitizerCache;
pub use css::CssSanitizer;
pub use error::{ConfigError, Result};
pub use options::SanitizeOptions;
pub use policy::{Config, ConfigBuilder};
pub use sanitizer::{Flavor, Sanitizer};

// ============================================================================
// Fragment Sanitization
// ============================================================================

/// Sanitize an HTML fragment against a configuration.
///
/// Blank input (empty or whitespace only) comes back unchanged. Output that
/// is identical to the input is returned borrowed.
pub fn sanitize<'a>(html: &'a str, config: &Config) -> Cow<'a, str> {
    if html.trim().is_empty() {
        return Cow::Borrowed(html);
    }

    // Escaping grows the output; a little headroom avoids most reallocations
    let mut out = HtmlSerializer::with_capacity(html.len() + html.len() / 8);
    PolicyEngine::new(config).run(Tokenizer::new(html), &mut out);
    let out = out.finish();

    if out == html {
        Cow::Borrowed(html)
    } else {
        Cow::Owned(out)
    }
}

/// Filter a `style` attribute value against the default CSS schema
pub fn sanitize_css(style: &str) -> String {
    css::sanitize_css(style)
}

// ============================================================================
// Stock Sanitizers
// ============================================================================

static STRIP_ALL: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::strip_all);
static NO_LINKS: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::no_links);

/// Remove every tag, keeping escaped text
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    STRIP_ALL.sanitize(html)
}

/// Remove anchors, applying the default allow-list to everything else
pub fn strip_links(html: &str) -> Cow<'_, str> {
    NO_LINKS.sanitize(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_output_is_borrowed() {
        let html = "<p>plain <b>bold</b></p>";
        assert!(matches!(sanitize(html, &Config::default()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_changed_output_is_owned() {
        let out = sanitize("<p onclick=\"x\">a</p>", &Config::default());
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out, "<p>a</p>");
    }

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_tags("<b>a</b> &amp; <i>b</i>"), "a &amp; b");
        assert_eq!(
            strip_links("<a href=\"http://x\">x</a><em>y</em>"),
            "x<em>y</em>"
        );
    }

    #[test]
    fn test_blank() {
        assert_eq!(sanitize(" \t", &Config::strip_all()), " \t");
        assert_eq!(sanitize_css(""), "");
    }
}
