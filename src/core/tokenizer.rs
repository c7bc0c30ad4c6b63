//! HTML Tokenizer - Lenient state machine for untrusted markup
//!
//! Implements a pull-parser style tokenizer that extracts HTML tokens:
//! - Element start/end tags (with attributes)
//! - Text content
//! - Comments, including bogus comments (`<!...>`, `<?...>`, `</ ...>`)
//! - Raw character data of script-like elements
//!
//! The tokenizer never fails. Anything that does not look like markup is
//! text, and constructs cut off by the end of input are closed there.

use super::attributes::{fold_case, parse_attributes, Attribute};
use super::scanner::Scanner;
use std::borrow::Cow;

/// A lexed HTML token. Text, comment and raw data are borrowed verbatim from
/// the input; references are decoded later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Start tag: <element attr="value">
    StartTag {
        name: Cow<'a, str>,
        attributes: Vec<Attribute<'a>>,
    },
    /// End tag: </element>
    EndTag { name: Cow<'a, str> },
    /// Start tag written with a trailing slash: <element/>
    SelfClosingTag {
        name: Cow<'a, str>,
        attributes: Vec<Attribute<'a>>,
    },
    /// Text content, references not yet decoded
    Text(&'a str),
    /// Comment or bogus comment body
    Comment(&'a str),
    /// Character data that is never decoded: the body of a raw-text element,
    /// or everything after `<plaintext>`
    CData(&'a str),
}

/// How the content following a start tag is lexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentMode {
    /// Ordinary markup
    Data,
    /// Raw text up to the matching end tag, emitted as CData
    RawText(&'static str),
    /// Text up to the matching end tag, references allowed
    EscapableRawText(&'static str),
    /// Everything to end of input is raw text
    Plaintext,
}

/// Elements whose content is raw text
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Elements whose content is text with references but no markup
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

fn content_mode_for(name: &str) -> ContentMode {
    if let Some(raw) = RAW_TEXT_ELEMENTS.iter().find(|&&e| e == name) {
        ContentMode::RawText(raw)
    } else if let Some(raw) = ESCAPABLE_RAW_TEXT_ELEMENTS.iter().find(|&&e| e == name) {
        ContentMode::EscapableRawText(raw)
    } else if name == "plaintext" {
        ContentMode::Plaintext
    } else {
        ContentMode::Data
    }
}

/// HTML tokenizer implementing a pull-parser pattern
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    mode: ContentMode,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            mode: ContentMode::Data,
        }
    }

    /// Rewind to the start of the input
    pub fn restart(&mut self) {
        self.scanner.set_position(0);
        self.mode = ContentMode::Data;
    }

    /// Get next token from input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            if self.scanner.is_eof() {
                return None;
            }

            match self.mode {
                ContentMode::Data => {}
                ContentMode::Plaintext => {
                    let rest = self.scanner.remaining();
                    self.scanner.set_position(self.scanner.len());
                    return Some(Token::CData(rest));
                }
                ContentMode::RawText(name) | ContentMode::EscapableRawText(name) => {
                    let raw = matches!(self.mode, ContentMode::RawText(_));
                    self.mode = ContentMode::Data;
                    let start = self.scanner.position();
                    let end = self
                        .scanner
                        .find_closing_tag(name)
                        .unwrap_or_else(|| self.scanner.len());
                    if end == start {
                        continue;
                    }
                    self.scanner.set_position(end);
                    let content = self.scanner.slice(start, end);
                    return Some(if raw {
                        Token::CData(content)
                    } else {
                        Token::Text(content)
                    });
                }
            }

            if self.opens_markup(self.scanner.position()) {
                if let Some(token) = self.parse_markup() {
                    return Some(token);
                }
                // Markup that produces nothing, e.g. "</>"
                continue;
            }

            return Some(self.parse_text());
        }
    }

    /// Check whether the '<' at `at` starts markup rather than literal text
    fn opens_markup(&self, at: usize) -> bool {
        let bytes = self.scanner.slice(at, self.scanner.len()).as_bytes();
        match (bytes.first(), bytes.get(1)) {
            (Some(b'<'), Some(b)) if b.is_ascii_alphabetic() || *b == b'!' || *b == b'?' => true,
            (Some(b'<'), Some(b'/')) => bytes.len() > 2,
            _ => false,
        }
    }

    /// Parse a text run up to the next '<' that opens markup
    fn parse_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        let mut from = start + 1;
        let end = loop {
            match self.scanner.find_tag_start_from(from) {
                Some(lt) if self.opens_markup(lt) => break lt,
                Some(lt) => from = lt + 1,
                None => break self.scanner.len(),
            }
        };
        self.scanner.set_position(end);
        Token::Text(self.scanner.slice(start, end))
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => {
                self.scanner.advance(1);
                self.parse_end_tag()
            }
            Some(b'!') => {
                self.scanner.advance(1);
                Some(self.parse_declaration())
            }
            Some(b'?') => Some(self.parse_bogus_comment()),
            _ => Some(self.parse_start_tag()),
        }
    }

    /// Parse start tag: <name attr="value"> or <name/>
    fn parse_start_tag(&mut self) -> Token<'a> {
        let name = fold_case(self.scanner.read_tag_name());
        let body = parse_attributes(&mut self.scanner);

        // A trailing slash does not stop raw-text lexing
        self.mode = content_mode_for(&name);

        if body.self_closing {
            Token::SelfClosingTag {
                name,
                attributes: body.attributes,
            }
        } else {
            Token::StartTag {
                name,
                attributes: body.attributes,
            }
        }
    }

    /// Parse end tag after "</"
    fn parse_end_tag(&mut self) -> Option<Token<'a>> {
        match self.scanner.peek() {
            Some(b'>') => {
                self.scanner.advance(1);
                None
            }
            Some(b) if b.is_ascii_alphabetic() => {
                let name = fold_case(self.scanner.read_tag_name());
                // Attributes on end tags are lexed for their quoting, then ignored
                parse_attributes(&mut self.scanner);
                Some(Token::EndTag { name })
            }
            _ => Some(self.parse_bogus_comment()),
        }
    }

    /// Parse markup after "<!"
    fn parse_declaration(&mut self) -> Token<'a> {
        if !self.scanner.starts_with(b"--") {
            return self.parse_bogus_comment();
        }

        // "<!-->" and "<!--->" close immediately
        let open = self.scanner.position();
        let body_start = open + 2;
        match self.scanner.find_str("-->") {
            Some(close) => {
                self.scanner.set_position(close + 3);
                Token::Comment(self.scanner.slice(body_start.min(close), close))
            }
            None => {
                let end = self.scanner.len();
                self.scanner.set_position(end);
                Token::Comment(self.scanner.slice(body_start.min(end), end))
            }
        }
    }

    /// Everything up to the next '>' is a comment
    fn parse_bogus_comment(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        match self.scanner.find_tag_end() {
            Some(gt) => {
                self.scanner.set_position(gt + 1);
                Token::Comment(self.scanner.slice(start, gt))
            }
            None => {
                let end = self.scanner.len();
                self.scanner.set_position(end);
                Token::Comment(self.scanner.slice(start, end))
            }
        }
    }
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
