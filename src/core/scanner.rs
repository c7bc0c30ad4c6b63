//! SIMD-accelerated HTML scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! Every delimiter the tokenizer searches for is ASCII, so positions returned
//! here always fall on UTF-8 character boundaries of the source `&str`.

use memchr::{memchr, memmem};

/// Cursor over untrusted markup
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Length of the whole input
    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    /// Get remaining input
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace inside a tag. NUL counts as a separator there.
    #[inline]
    pub fn skip_tag_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_tag_space(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Find next '<' (tag start) using SIMD
    #[inline]
    pub fn find_tag_start_from(&self, from: usize) -> Option<usize> {
        memchr(b'<', &self.bytes()[from..]).map(|i| from + i)
    }

    /// Find next '>' (tag end) using SIMD
    #[inline]
    pub fn find_tag_end(&self) -> Option<usize> {
        memchr(b'>', &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find a multi-byte needle from the current position
    #[inline]
    pub fn find_str(&self, needle: &str) -> Option<usize> {
        memmem::find(&self.bytes()[self.pos..], needle.as_bytes()).map(|i| self.pos + i)
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.bytes()[self.pos..].starts_with(needle)
    }

    /// Case-insensitive (ASCII) prefix check at an absolute position
    #[inline]
    pub fn starts_with_ignore_case_at(&self, at: usize, needle: &[u8]) -> bool {
        self.bytes()
            .get(at..at + needle.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(needle))
    }

    /// Read a lenient HTML tag name: everything up to whitespace, '/', '>' or NUL
    pub fn read_tag_name(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_tag_space(b) || b == b'/' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Locate the end tag that closes a raw-text element, e.g. `</script`.
    ///
    /// Returns the position of the `<`. The name must be followed by
    /// whitespace, '/', '>' or end of input to count.
    pub fn find_closing_tag(&self, name: &str) -> Option<usize> {
        let bytes = self.bytes();
        let mut from = self.pos;
        while let Some(lt) = self.find_tag_start_from(from) {
            if bytes.get(lt + 1) == Some(&b'/')
                && self.starts_with_ignore_case_at(lt + 2, name.as_bytes())
            {
                match bytes.get(lt + 2 + name.len()) {
                    None => return Some(lt),
                    Some(&b) if is_tag_space(b) || b == b'/' || b == b'>' => return Some(lt),
                    _ => {}
                }
            }
            from = lt + 1;
        }
        None
    }
}

/// Whitespace as understood inside tags (HTML space characters plus NUL)
#[inline]
pub fn is_tag_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C | 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        let scanner = Scanner::new("hello <world>");
        assert_eq!(scanner.find_tag_start_from(0), Some(6));
    }

    #[test]
    fn test_read_tag_name_stops_at_nul() {
        let mut scanner = Scanner::new("SCR\0IPT>");
        assert_eq!(scanner.read_tag_name(), "SCR");
        assert_eq!(scanner.position(), 3);
    }

    #[test]
    fn test_read_tag_name_keeps_angle_bracket() {
        let mut scanner = Scanner::new("a<a");
        assert_eq!(scanner.read_tag_name(), "a<a");
        assert!(scanner.is_eof());
    }

    #[test]
    fn test_skip_tag_whitespace() {
        let mut scanner = Scanner::new("  \t\n\0 hello");
        scanner.skip_tag_whitespace();
        assert_eq!(scanner.position(), 6);
    }

    #[test]
    fn test_find_closing_tag_is_case_insensitive() {
        let scanner = Scanner::new("alert(1)//<</SCRIPT>tail");
        assert_eq!(scanner.find_closing_tag("script"), Some(11));
    }

    #[test]
    fn test_find_closing_tag_requires_delimiter() {
        let scanner = Scanner::new("</scripty></script >");
        assert_eq!(scanner.find_closing_tag("script"), Some(10));
    }
}
