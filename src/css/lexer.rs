//! Style attribute lexing
//!
//! Splits a declaration list, decodes CSS escapes and breaks property values
//! into the small set of tokens the schema knows how to judge.

use std::borrow::Cow;

/// Deepest function nesting that is lexed; anything deeper is discarded
const MAX_FUNCTION_DEPTH: usize = 8;

/// A lexed component of a property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueToken {
    /// Bare word, e.g. `bold`
    Ident(String),
    /// Number with optional unit or percent sign, e.g. `-1.5em`
    Number(String),
    /// `#` followed by a name, e.g. `#fff`
    Hash(String),
    /// Quoted string, without its quotes
    Str(String),
    /// Function call other than `url(`, e.g. `rgb(0, 0, 0)`
    Function { name: String, args: Vec<ValueToken> },
    /// Argument of `url(...)`, unquoted and trimmed
    Url(String),
    Comma,
    Slash,
}

impl ValueToken {
    /// Separators join their neighbours instead of being spaced
    pub fn is_separator(&self) -> bool {
        matches!(self, ValueToken::Comma | ValueToken::Slash)
    }
}

/// Replace `/* ... */` comments with a single space. An unterminated comment
/// runs to the end of the input.
pub fn strip_comments(input: &str) -> Cow<'_, str> {
    if !input.contains("/*") {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        out.push(' ');
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Split a declaration list on ';' outside quotes and parentheses
pub fn split_declarations(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match (quote, b) {
            (_, b'\\') => i += 1,
            (Some(q), _) if b == q => quote = None,
            (Some(_), b'\n') => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'(') => depth += 1,
            (None, b')') => depth = depth.saturating_sub(1),
            (None, b';') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}

/// Decode CSS escapes: `\` + 1 to 6 hex digits (one trailing whitespace
/// consumed), `\` + newline (removed), `\` + any other character (that
/// character).
pub fn decode_escapes(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code: u32 = 0;
        let mut digits = 0;
        while digits < 6 {
            match chars.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    digits += 1;
                    chars.next();
                }
                None => break,
            }
        }

        if digits > 0 {
            if matches!(chars.peek(), Some(' ' | '\t' | '\n' | '\r' | '\u{C}')) {
                chars.next();
            }
            let decoded = match code {
                0 => char::REPLACEMENT_CHARACTER,
                _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
            };
            out.push(decoded);
            continue;
        }

        match chars.next() {
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Remove a trailing `!important`
pub fn strip_important(value: &str) -> &str {
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return &value[..bang];
        }
    }
    value
}

/// Lex a property value. Escapes are decoded inside each token; characters
/// that start no token are dropped.
pub fn tokenize_value(value: &str) -> Vec<ValueToken> {
    let mut lexer = ValueLexer {
        input: value,
        pos: 0,
    };
    lexer.tokens(0)
}

struct ValueLexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ValueLexer<'a> {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Lex until end of input, or until the ')' closing the current function
    fn tokens(&mut self, depth: usize) -> Vec<ValueToken> {
        let mut out = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                ')' if depth > 0 => {
                    self.bump();
                    return out;
                }
                ',' => {
                    self.bump();
                    out.push(ValueToken::Comma);
                }
                '/' => {
                    self.bump();
                    out.push(ValueToken::Slash);
                }
                '"' | '\'' => {
                    self.bump();
                    out.push(ValueToken::Str(self.string(c)));
                }
                '#' => {
                    self.bump();
                    let name = self.name();
                    if !name.is_empty() {
                        out.push(ValueToken::Hash(name));
                    }
                }
                c if starts_number(c, self.peek_second()) => {
                    out.push(ValueToken::Number(self.number()));
                }
                c if is_name_start(c) => {
                    let name = self.name();
                    if self.peek() != Some('(') {
                        out.push(ValueToken::Ident(name));
                        continue;
                    }
                    self.bump(); // Skip '('
                    if name.eq_ignore_ascii_case("url") {
                        out.push(ValueToken::Url(self.url_body()));
                    } else if depth >= MAX_FUNCTION_DEPTH {
                        self.skip_group();
                    } else {
                        let args = self.tokens(depth + 1);
                        out.push(ValueToken::Function {
                            name: name.to_ascii_lowercase(),
                            args,
                        });
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
        out
    }

    /// Name characters and escapes, returned with escapes decoded
    fn name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.skip_escape_body();
            } else if is_name_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        decode_escapes(&self.input[start..self.pos]).into_owned()
    }

    /// Skip what follows a backslash: up to 6 hex digits and one whitespace,
    /// or a single character
    fn skip_escape_body(&mut self) {
        let mut digits = 0;
        while digits < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
            digits += 1;
        }
        if digits == 0 {
            self.bump();
        } else if matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r' | '\u{C}')) {
            self.bump();
        }
    }

    fn number(&mut self) -> String {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            self.bump();
        }
        if self.peek() == Some('%') {
            self.bump();
        } else {
            while let Some(c) = self.peek() {
                if !c.is_ascii_alphabetic() {
                    break;
                }
                self.bump();
            }
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    /// Quoted string body with escapes decoded; ends at the matching quote,
    /// an unescaped newline or end of input
    fn string(&mut self, quote: char) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.skip_escape_body();
                continue;
            }
            if c == quote || c == '\n' {
                let body = decode_escapes(&self.input[start..self.pos]).into_owned();
                self.bump();
                return body;
            }
            self.bump();
        }
        decode_escapes(&self.input[start..]).into_owned()
    }

    /// Argument of `url(`, up to and including the closing ')'
    fn url_body(&mut self) -> String {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let body = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                self.string(q)
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ')' {
                        break;
                    }
                    self.bump();
                }
                decode_escapes(self.input[start..self.pos].trim()).into_owned()
            }
        };
        // Anything between the argument and ')' is discarded
        while let Some(c) = self.bump() {
            if c == ')' {
                break;
            }
        }
        body
    }

    /// Discard a parenthesized group whose '(' was already consumed
    fn skip_group(&mut self) {
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

#[inline]
fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}

#[inline]
fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

#[inline]
fn starts_number(c: char, next: Option<char>) -> bool {
    match c {
        '0'..='9' => true,
        '.' => next.is_some_and(|n| n.is_ascii_digit()),
        '+' | '-' => next.is_some_and(|n| n.is_ascii_digit() || n == '.'),
        _ => false,
    }
}
