//! Inline style filtering
//!
//! `CssSanitizer` reduces a `style` attribute value to the declarations its
//! schema allows, re-serialized canonically as `name:value` pairs joined by
//! ';'. It never looks at the surrounding document.

pub mod lexer;
pub mod schema;

use crate::core::entities::decode_html;
use crate::policy::url::{is_allowed_url, protocol_set, DEFAULT_PROTOCOLS};
use lexer::{
    decode_escapes, split_declarations, strip_comments, strip_important, tokenize_value,
    ValueToken,
};
use schema::{CssSchema, PropertyFlags, PropertyRule, UNITS};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Substrings that reject a value outright once it is normalized
const TRIGGERS: &[&str] = &[
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior:",
];

/// Allow-list filter for `style` attribute values
#[derive(Debug, Clone)]
pub struct CssSanitizer {
    schema: Arc<CssSchema>,
    protocols: HashSet<String>,
}

impl Default for CssSanitizer {
    fn default() -> Self {
        CssSanitizer::new(CssSchema::default_schema())
    }
}

impl CssSanitizer {
    /// Create a sanitizer over a schema, allowing the default URL schemes
    pub fn new(schema: Arc<CssSchema>) -> Self {
        CssSanitizer {
            schema,
            protocols: protocol_set(DEFAULT_PROTOCOLS),
        }
    }

    /// Replace the schemes accepted inside `url()`
    pub fn with_protocols(mut self, protocols: HashSet<String>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Filter a declaration list. Returns an empty string when nothing survives.
    pub fn sanitize(&self, style: &str) -> String {
        let style = strip_comments(style);
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = String::new();

        for declaration in split_declarations(&style) {
            let Some((raw_name, raw_value)) = declaration.split_once(':') else {
                continue;
            };

            let name = decode_escapes(raw_name).trim().to_ascii_lowercase();
            if name.is_empty() || seen.contains(&name) {
                continue;
            }
            let Some(rule) = self.schema.get(&name) else {
                trace!(property = %name, "dropping unknown css property");
                continue;
            };

            let value = strip_important(raw_value);
            if self.is_dangerous(value, rule) {
                trace!(property = %name, "dropping css value with forbidden construct");
                continue;
            }

            let rendered = self.render(tokenize_value(value), rule);
            if rendered.is_empty() {
                continue;
            }

            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(&name);
            out.push(':');
            out.push_str(&rendered);
            seen.insert(name);
        }

        out
    }

    /// Look for script-bearing constructs in the value with escapes and
    /// references decoded, whitespace and controls removed, case folded.
    fn is_dangerous(&self, value: &str, rule: &PropertyRule) -> bool {
        let unescaped = decode_escapes(value);
        let decoded = decode_html(&unescaped);
        let normalized: String = decoded
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .flat_map(char::to_lowercase)
            .collect();

        if TRIGGERS.iter().any(|t| normalized.contains(t)) {
            return true;
        }

        // Each argument is scanned once; the search resumes after its ')'
        let mut rest = normalized.as_str();
        while let Some(at) = rest.find("url(") {
            if !rule.flags.contains(PropertyFlags::URL) {
                return true;
            }
            let tail = &rest[at + 4..];
            let (arg, next) = match tail.find(')') {
                Some(close) => (&tail[..close], &tail[close + 1..]),
                None => (tail, ""),
            };
            let arg = arg.trim_matches(|c| c == '"' || c == '\'');
            if !is_allowed_url(arg, &self.protocols) {
                return true;
            }
            rest = next;
        }
        false
    }

    /// Keep the tokens the rule accepts and serialize them
    fn render(&self, tokens: Vec<ValueToken>, rule: &PropertyRule) -> String {
        let kept: Vec<(bool, String)> = tokens
            .into_iter()
            .filter_map(|token| {
                let is_separator = token.is_separator();
                self.render_token(token, rule).map(|piece| (is_separator, piece))
            })
            .collect();

        let mut out = String::new();
        let mut last_was_separator = true;
        for (is_separator, piece) in kept {
            if is_separator {
                // Separators need a value on both sides
                if last_was_separator {
                    continue;
                }
                out.push_str(&piece);
            } else {
                if !last_was_separator {
                    out.push(' ');
                }
                out.push_str(&piece);
            }
            last_was_separator = is_separator;
        }
        if last_was_separator {
            while out.ends_with(',') || out.ends_with('/') {
                out.pop();
            }
        }
        out
    }

    fn render_token(&self, token: ValueToken, rule: &PropertyRule) -> Option<String> {
        let flags = rule.flags;
        match token {
            ValueToken::Comma => Some(",".to_string()),
            ValueToken::Slash => Some("/".to_string()),
            ValueToken::Ident(word) => {
                let lower = word.to_ascii_lowercase();
                if rule.allows_keyword(&lower) {
                    Some(lower)
                } else if flags.contains(PropertyFlags::UNRESERVED_WORD) && is_plain_word(&word) {
                    Some(word)
                } else {
                    None
                }
            }
            ValueToken::Number(number) => {
                let valid = flags.contains(PropertyFlags::QUANTITY)
                    && valid_quantity(&number, flags.contains(PropertyFlags::NEGATIVE));
                valid.then_some(number)
            }
            ValueToken::Hash(hex) => {
                let valid = matches!(hex.len(), 3 | 4 | 6 | 8)
                    && hex.bytes().all(|b| b.is_ascii_hexdigit());
                (valid && flags.contains(PropertyFlags::HASH_COLOR)).then(|| format!("#{hex}"))
            }
            ValueToken::Str(s) => flags
                .contains(PropertyFlags::STRING)
                .then(|| quote_string(&s)),
            ValueToken::Function { name, args } => {
                if !rule.functions.contains(&name) {
                    return None;
                }
                let mut rendered = String::with_capacity(name.len() + 16);
                rendered.push_str(&name);
                rendered.push('(');
                for arg in args {
                    match arg {
                        ValueToken::Number(n) if valid_quantity(&n, true) => rendered.push_str(&n),
                        ValueToken::Comma => rendered.push(','),
                        ValueToken::Slash => rendered.push('/'),
                        _ => return None,
                    }
                }
                rendered.push(')');
                Some(rendered)
            }
            ValueToken::Url(url) => {
                let allowed = flags.contains(PropertyFlags::URL)
                    && is_allowed_url(&decode_html(&url), &self.protocols);
                allowed.then(|| format!("url({})", quote_string(&url)))
            }
        }
    }
}

/// An identifier that can be written back without escaping. Escapes are
/// decoded by the lexer, so anything else could reintroduce `;`, `:` or
/// quotes into the output.
fn is_plain_word(word: &str) -> bool {
    !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Check a lexed number: digits present, at most one '.', a known unit
fn valid_quantity(number: &str, allow_negative: bool) -> bool {
    let body = number.strip_prefix('+').unwrap_or(number);
    let body = match body.strip_prefix('-') {
        Some(rest) if allow_negative => rest,
        Some(_) => return false,
        None => body,
    };
    let split = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    let (digits, unit) = body.split_at(split);
    digits.bytes().any(|b| b.is_ascii_digit())
        && digits.bytes().filter(|&b| b == b'.').count() <= 1
        && UNITS.contains(&unit)
}

/// Single-quote a string, escaping everything that could end it or the
/// attribute it sits in
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' | '"' | '\\' | '<' | '>' | '&' => {
                out.push_str(&format!("\\{:x} ", c as u32));
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Filter a style value against the default schema
pub fn sanitize_css(style: &str) -> String {
    CssSanitizer::default().sanitize(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_allowed_declarations() {
        let raw = "display:block; position:absolute; left:0; top:0; width:100%; height:100%; \
                   z-index:1; background-color:black; \
                   background-image:url(http://www.ragingplatypus.com/i/cam-full.jpg); \
                   background-x:center; background-y:center; background-repeat:repeat;";
        assert_eq!(
            sanitize_css(raw),
            "width:100%;height:100%;background-color:black;background-repeat:repeat"
        );
    }

    #[test]
    fn test_trailing_space() {
        assert_eq!(sanitize_css("width:100%; "), "width:100%");
    }

    #[test]
    fn test_expression_rejected() {
        assert_eq!(sanitize_css("width: expression(alert('XSS'));"), "");
        assert_eq!(sanitize_css("\nwidth:\nexpression(alert('XSS'));\n"), "");
        assert_eq!(sanitize_css("width: e\\78 pression(alert(1))"), "");
    }

    #[test]
    fn test_moz_binding_rejected() {
        assert_eq!(
            sanitize_css("-moz-binding:url('http://ha.ckers.org/xssmoz.xml#xss')"),
            ""
        );
    }

    #[test]
    fn test_unicode_escaped_url_rejected() {
        let raw = "background-image:\\0075\\0072\\006C\\0028'\\006a\\0061\\0076\\0061\\0073\\0063\\0072\\0069\\0070\\0074\\003a\\0061\\006c\\0065\\0072\\0074\\0028.1027\\0058.1053\\0053\\0027\\0029'\\0029";
        assert_eq!(sanitize_css(raw), "");
    }

    #[test]
    fn test_color_normalization() {
        assert_eq!(sanitize_css("COLOR: #000"), "color:#000");
        assert_eq!(sanitize_css("color: RED !important"), "color:red");
        assert_eq!(sanitize_css("color: rgb(0, 10, 20)"), "color:rgb(0,10,20)");
        assert_eq!(sanitize_css("color: #12"), "");
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(sanitize_css("color:red;color:blue"), "color:red");
        assert_eq!(sanitize_css("color:bogus;color:blue"), "color:blue");
    }

    #[test]
    fn test_partial_value_keeps_valid_tokens() {
        assert_eq!(sanitize_css("margin: 0 bogus 1px"), "margin:0 1px");
        assert_eq!(sanitize_css("padding: -1px"), "");
        assert_eq!(sanitize_css("margin: -1px"), "margin:-1px");
    }

    #[test]
    fn test_font_family_strings_are_requoted() {
        assert_eq!(
            sanitize_css("font-family: \"Times New Roman\", serif"),
            "font-family:'Times New Roman',serif"
        );
        assert_eq!(
            sanitize_css("font-family: 'a\\'b'"),
            "font-family:'a\\27 b'"
        );
    }

    #[test]
    fn test_escaped_punctuation_in_words_is_dropped() {
        assert_eq!(
            sanitize_css(r"font-family: a\3b position\3a fixed\3b top\3a 0"),
            ""
        );
        assert_eq!(sanitize_css(r"font-family: arial, a\3b z-index\3a 9"), "font-family:arial");
        for word in [r"a\27 b", r"a\28 b", r"a\2f\2a b", r"a\3a b", r"a\3b b"] {
            assert_eq!(sanitize_css(&format!("font-family: {word}")), "", "{word}");
        }
        assert_eq!(sanitize_css(r"font-family: \61 rial"), "font-family:arial");
    }

    #[test]
    fn test_unclosed_url_arguments_scan_linearly() {
        let schema = CssSchema::new().with_property(
            "background-image",
            PropertyRule::new(PropertyFlags::URL),
        );
        let css = CssSanitizer::new(Arc::new(schema));
        let raw = format!("background-image: {}", "url(x".repeat(50_000));
        assert!(css.sanitize(&raw).starts_with("background-image:url('xurl(x"));
        let raw = format!("background-image: url(javascript:x) {}", "url(x".repeat(50_000));
        assert_eq!(css.sanitize(&raw), "");
        let raw = format!("background-image: {}", "url(http://x/) ".repeat(50_000));
        assert!(css.sanitize(&raw).starts_with("background-image:url('http://x/')"));
    }

    #[test]
    fn test_url_only_on_url_properties() {
        let schema = CssSchema::new().with_property(
            "background-image",
            PropertyRule::new(PropertyFlags::URL),
        );
        let css = CssSanitizer::new(Arc::new(schema));
        assert_eq!(
            css.sanitize("background-image: url(http://x/i.png)"),
            "background-image:url('http://x/i.png')"
        );
        assert_eq!(css.sanitize("background-image: url(javascript:alert(1))"), "");
        assert_eq!(sanitize_css("color: url(http://x/i.png)"), "");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize_css("color:/* hi */red"), "color:red");
        assert_eq!(sanitize_css("col/**/or:red"), "");
    }

    #[test]
    fn test_garbage_never_panics() {
        for raw in [":", ";;;", "color", "color:", "::::", "(", "'", "\\", "url(", "a:b:c"] {
            let _ = sanitize_css(raw);
        }
    }
}
