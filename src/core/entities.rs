//! HTML Character Reference Codec
//!
//! Handles decoding of character references:
//! - Numeric character references: &#123; &#x7B; (semicolon optional)
//! - Named references from the table in `named_entities`
//!
//! and the output encoding every rendered character goes through.
//!
//! Uses Cow for zero-copy when nothing needs to change.

use super::named_entities::{lookup, LEGACY_NAMES, MAX_NAME_LEN};
use memchr::memchr;
use std::borrow::Cow;

/// Where a reference is being decoded. Legacy names behave differently
/// inside attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Text,
    Attribute,
}

/// Decode character references in text content
#[inline]
pub fn decode_html(input: &str) -> Cow<'_, str> {
    decode(input, DecodeMode::Text)
}

/// Decode character references in an attribute value
#[inline]
pub fn decode_attribute(input: &str) -> Cow<'_, str> {
    decode(input, DecodeMode::Attribute)
}

/// Decode all character references in the input
///
/// Returns Borrowed if no '&' is present (zero-copy).
pub fn decode(input: &str, mode: DecodeMode) -> Cow<'_, str> {
    let bytes = input.as_bytes();

    // Fast path: check if there are any references using SIMD
    if memchr(b'&', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + offset;
        result.push_str(&input[pos..amp]);

        match decode_reference(input, amp + 1, mode) {
            Some((c, next)) => {
                result.push(c);
                pos = next;
            }
            None => {
                // Not a reference, keep the ampersand
                result.push('&');
                pos = amp + 1;
            }
        }
    }
    result.push_str(&input[pos..]);

    Cow::Owned(result)
}

/// Decode one reference starting just after the '&'
///
/// Returns the character and the position after the reference.
fn decode_reference(input: &str, at: usize, mode: DecodeMode) -> Option<(char, usize)> {
    match input.as_bytes().get(at)? {
        b'#' => decode_numeric(input.as_bytes(), at + 1),
        _ => decode_named(input, at, mode),
    }
}

fn decode_numeric(bytes: &[u8], at: usize) -> Option<(char, usize)> {
    let (radix, mut pos) = match bytes.get(at) {
        Some(b'x') | Some(b'X') => (16, at + 1),
        _ => (10, at),
    };

    let digits_start = pos;
    let mut codepoint: u32 = 0;
    while let Some(digit) = bytes.get(pos).and_then(|&b| char::from(b).to_digit(radix)) {
        // Clamp so long digit runs can neither overflow nor become valid again
        codepoint = (codepoint * radix + digit).min(0x11_0000);
        pos += 1;
    }

    if pos == digits_start {
        return None;
    }
    if bytes.get(pos) == Some(&b';') {
        pos += 1;
    }

    Some((numeric_char(codepoint), pos))
}

fn decode_named(input: &str, at: usize, mode: DecodeMode) -> Option<(char, usize)> {
    let bytes = input.as_bytes();
    let mut end = at;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() && end - at <= MAX_NAME_LEN {
        end += 1;
    }
    if end == at || end - at > MAX_NAME_LEN {
        return None;
    }

    let name = &input[at..end];
    if bytes.get(end) == Some(&b';') {
        if let Some(c) = lookup(name) {
            return Some((c, end + 1));
        }
    }

    if LEGACY_NAMES.contains(&name) {
        if mode == DecodeMode::Attribute && bytes.get(end) == Some(&b'=') {
            return None;
        }
        return lookup(name).map(|c| (c, end));
    }

    None
}

/// Map a numeric reference to the character it denotes
fn numeric_char(codepoint: u32) -> char {
    match codepoint {
        0 => char::REPLACEMENT_CHARACTER,
        0x80..=0x9F => windows_1252(codepoint),
        _ => char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

/// References in the C1 range name Windows-1252 characters
fn windows_1252(codepoint: u32) -> char {
    let mapped = match codepoint {
        0x80 => 0x20AC,
        0x82 => 0x201A,
        0x83 => 0x0192,
        0x84 => 0x201E,
        0x85 => 0x2026,
        0x86 => 0x2020,
        0x87 => 0x2021,
        0x88 => 0x02C6,
        0x89 => 0x2030,
        0x8A => 0x0160,
        0x8B => 0x2039,
        0x8C => 0x0152,
        0x8E => 0x017D,
        0x91 => 0x2018,
        0x92 => 0x2019,
        0x93 => 0x201C,
        0x94 => 0x201D,
        0x95 => 0x2022,
        0x96 => 0x2013,
        0x97 => 0x2014,
        0x98 => 0x02DC,
        0x99 => 0x2122,
        0x9A => 0x0161,
        0x9B => 0x203A,
        0x9C => 0x0153,
        0x9E => 0x017E,
        0x9F => 0x0178,
        other => other,
    };
    char::from_u32(mapped).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Characters that never reach the output
#[inline]
pub fn is_dropped_char(c: char) -> bool {
    matches!(c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' |
        '\u{7F}'..='\u{9F}' |
        '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Replacement for characters that are significant in HTML, attributes or
/// legacy parsers. The exact references are part of the output contract.
#[inline]
fn replacement(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("&#34;"),
        '&' => Some("&amp;"),
        '\'' => Some("&#39;"),
        '+' => Some("&#43;"),
        '<' => Some("&lt;"),
        '=' => Some("&#61;"),
        '>' => Some("&gt;"),
        '@' => Some("&#64;"),
        '`' => Some("&#96;"),
        _ => None,
    }
}

/// Encode text or an attribute value for output
pub fn encode_html(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input.chars().any(|c| replacement(c).is_some() || is_dropped_char(c)) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    encode_html_onto(input, &mut result);
    Cow::Owned(result)
}

/// Encode into an existing buffer
pub fn encode_html_onto(input: &str, out: &mut String) {
    for c in input.chars() {
        if let Some(rep) = replacement(c) {
            out.push_str(rep);
        } else if !is_dropped_char(c) {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_references() {
        let result = decode_html("Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        assert_eq!(decode_html("&lt;hello&gt; &amp; &quot;world&quot;"), "<hello> & \"world\"");
    }

    #[test]
    fn test_numeric_decimal() {
        assert_eq!(decode_html("&#65;&#66;&#67;"), "ABC");
    }

    #[test]
    fn test_numeric_hex() {
        assert_eq!(decode_html("&#x41;&#X42;&#x43;"), "ABC");
    }

    #[test]
    fn test_numeric_without_semicolon() {
        assert_eq!(decode_attribute("&#0000106&#0000097&#x76&#x61"), "java");
    }

    #[test]
    fn test_numeric_out_of_range() {
        assert_eq!(decode_html("&#0;"), "\u{FFFD}");
        assert_eq!(decode_html("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode_html("&#99999999999999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_windows_1252_range() {
        assert_eq!(decode_html("&#150;&#x80;"), "\u{2013}\u{20AC}");
    }

    #[test]
    fn test_unicode_entity() {
        assert_eq!(decode_html("&#x1F600;"), "😀");
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(decode_html("&unknown;"), "&unknown;");
        assert_eq!(decode_html("a & b"), "a & b");
        assert_eq!(decode_html("&#;"), "&#;");
    }

    #[test]
    fn test_legacy_name_without_semicolon() {
        assert_eq!(decode_html("&amp &lt"), "& <");
        assert_eq!(decode_attribute("?a=1&amp=2"), "?a=1&amp=2");
        assert_eq!(decode_html("&colon"), "&colon");
    }

    #[test]
    fn test_obfuscated_colon() {
        assert_eq!(decode_attribute("javascript&colon;alert(1)"), "javascript:alert(1)");
    }

    #[test]
    fn test_encode_table() {
        assert_eq!(
            encode_html("<\"'&=@+`>"),
            "&lt;&#34;&#39;&amp;&#61;&#64;&#43;&#96;&gt;"
        );
    }

    #[test]
    fn test_encode_drops_controls() {
        assert_eq!(encode_html("a\u{0}b\u{1}c\td\n\u{7F}"), "abc\td\n");
    }

    #[test]
    fn test_encode_borrowed_when_clean() {
        assert!(matches!(encode_html("plain text"), Cow::Borrowed(_)));
    }
}
