//! HTML Attribute Parsing
//!
//! Lexes attributes from tag content following the HTML attribute states:
//! quotes only delimit a value after '=', a quote inside a name is part of the
//! name, and '/' between attributes is a separator.

use super::entities::decode_attribute;
use super::scanner::{is_tag_space, Scanner};
use std::borrow::Cow;

/// A lexed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, ASCII-lowercased
    pub name: Cow<'a, str>,
    /// Raw attribute value (references not yet decoded)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Attribute {
            name: fold_case(name),
            value: Cow::Borrowed(value),
        }
    }

    /// An attribute written without '=' carries its own name as value
    pub fn valueless(name: &'a str) -> Self {
        let name = fold_case(name);
        Attribute {
            value: name.clone(),
            name,
        }
    }

    /// Get the value with character references decoded
    pub fn decoded_value(&self) -> Cow<'_, str> {
        decode_attribute(&self.value)
    }
}

/// Attributes and trailing flags of one tag
#[derive(Debug, Clone, Default)]
pub struct TagBody<'a> {
    pub attributes: Vec<Attribute<'a>>,
    /// Tag ended with "/>"
    pub self_closing: bool,
}

/// ASCII-lowercase a name, borrowing when it already is
#[inline]
pub fn fold_case(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Parse attributes up to and including the closing '>'
///
/// The scanner must be positioned right after the tag name. If the input
/// ends first, whatever was lexed so far is returned.
pub fn parse_attributes<'a>(scanner: &mut Scanner<'a>) -> TagBody<'a> {
    let mut body = TagBody::default();

    loop {
        scanner.skip_tag_whitespace();

        match scanner.peek() {
            None => break,
            Some(b'>') => {
                scanner.advance(1);
                break;
            }
            Some(b'/') => {
                scanner.advance(1);
                if scanner.peek() == Some(b'>') {
                    body.self_closing = true;
                }
                continue;
            }
            Some(_) => {}
        }

        // Attribute name. The first byte is taken unconditionally so a
        // leading '=' becomes part of the name.
        let name_start = scanner.position();
        scanner.advance(1);
        while let Some(b) = scanner.peek() {
            if is_tag_space(b) || matches!(b, b'/' | b'>' | b'=') {
                break;
            }
            scanner.advance(1);
        }
        let name = scanner.slice(name_start, scanner.position());

        scanner.skip_tag_whitespace();
        if scanner.peek() != Some(b'=') {
            body.attributes.push(Attribute::valueless(name));
            continue;
        }
        scanner.advance(1); // Skip '='
        scanner.skip_tag_whitespace();

        let value = match scanner.peek() {
            None | Some(b'>') => "",
            Some(quote @ (b'"' | b'\'')) => {
                let open = scanner.position();
                scanner.advance(1);
                match scanner.find_byte(quote) {
                    Some(close) => {
                        scanner.set_position(close + 1);
                        scanner.slice(open + 1, close)
                    }
                    None => {
                        // Unterminated: the rest of the input, opening quote included
                        let end = scanner.len();
                        scanner.set_position(end);
                        scanner.slice(open, end)
                    }
                }
            }
            Some(_) => {
                let start = scanner.position();
                while let Some(b) = scanner.peek() {
                    if is_tag_space(b) || b == b'>' {
                        break;
                    }
                    scanner.advance(1);
                }
                scanner.slice(start, scanner.position())
            }
        };
        body.attributes.push(Attribute::new(name, value));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> TagBody<'_> {
        let mut scanner = Scanner::new(input);
        parse_attributes(&mut scanner)
    }

    fn pairs<'a>(body: &'a TagBody<'_>) -> Vec<(&'a str, &'a str)> {
        body.attributes
            .iter()
            .map(|a| (a.name.as_ref(), a.value.as_ref()))
            .collect()
    }

    #[test]
    fn test_simple_attributes() {
        let body = parse(" id=\"test\" class='foo'>");
        assert_eq!(pairs(&body), vec![("id", "test"), ("class", "foo")]);
        assert!(!body.self_closing);
    }

    #[test]
    fn test_names_are_folded() {
        let body = parse(" SRC=x>");
        assert_eq!(pairs(&body), vec![("src", "x")]);
    }

    #[test]
    fn test_unquoted_value_keeps_slashes() {
        let body = parse(" href=http://x/>");
        assert_eq!(pairs(&body), vec![("href", "http://x/")]);
        assert!(!body.self_closing);
    }

    #[test]
    fn test_slash_separates_attributes() {
        let body = parse("/src=\"a.js\"/>");
        assert_eq!(pairs(&body), vec![("src", "a.js")]);
        assert!(body.self_closing);
    }

    #[test]
    fn test_quotes_in_name_are_literal() {
        let body = parse(" \"\"\">rest");
        assert_eq!(pairs(&body), vec![("\"\"\"", "\"\"\"")]);
    }

    #[test]
    fn test_unterminated_quote_swallows_rest() {
        let body = parse(" class=\"\\");
        assert_eq!(pairs(&body), vec![("class", "\"\\")]);
    }

    #[test]
    fn test_whitespace_around_equals() {
        let body = parse("\nSRC\n=\n\"\nj\na\n\"\n>");
        assert_eq!(pairs(&body), vec![("src", "\nj\na\n")]);
    }

    #[test]
    fn test_leading_equals_is_part_of_name() {
        let body = parse(" =x>");
        assert_eq!(pairs(&body), vec![("=x", "=x")]);
    }

    #[test]
    fn test_nul_breaks_names() {
        let body = parse("\0IPT>");
        assert_eq!(pairs(&body), vec![("ipt", "ipt")]);
    }

    #[test]
    fn test_decoded_value() {
        let body = parse(" title=\"&lt;hello&gt;\">");
        assert_eq!(body.attributes[0].decoded_value(), "<hello>");
    }
}
