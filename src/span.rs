use std::fmt;
use std::str::CharIndices;

use crate::tokenizer::RowError;

/// Borrowed view into a row of text.
///
/// Offsets are byte offsets into `text` and always sit on char boundaries.
/// Sub-slicing clamps to the parent's bounds, so a derived span can never read
/// past the end of the span it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan<'src> {
    text: &'src str,
    start: usize,
    end: usize,
}

impl<'src> TextSpan<'src> {
    pub fn from(text: &'src str) -> Self {
        Self { text, start: 0, end: text.len() }
    }

    pub fn empty() -> Self {
        Self { text: "", start: 0, end: 0 }
    }

    pub fn len(&self) -> usize { self.end - self.start }

    pub fn is_empty(&self) -> bool { self.start == self.end }

    /// Offset of this span's first byte in the backing text.
    pub fn start(&self) -> usize { self.start }

    pub fn head_char(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    pub fn tail(&self) -> Self {
        match self.head_char() {
            Some(c) => self.slice(c.len_utf8()),
            None => *self,
        }
    }

    pub fn slice(&self, start: usize) -> Self {
        self.slice_to(start, self.len())
    }

    pub fn slice_to(&self, start: usize, end: usize) -> Self {
        let end = self.floor_boundary(self.start.saturating_add(end).min(self.end));
        let start = self.floor_boundary(self.start.saturating_add(start).min(end));
        Self { text: self.text, start, end }
    }

    pub fn at(&self, index: usize) -> Result<char, RowError> {
        let out_of_bounds = || RowError::Index { index, len: self.len() };
        if index >= self.len() {
            return Err(out_of_bounds());
        }
        let absolute = self.start.checked_add(index).ok_or_else(out_of_bounds)?;
        if !self.text.is_char_boundary(absolute) {
            return Err(out_of_bounds());
        }
        self.text[absolute..self.end].chars().next().ok_or_else(out_of_bounds)
    }

    /// Chars paired with their offset relative to this span.
    pub fn char_indices(&self) -> CharIndices<'src> {
        self.text[self.start..self.end].char_indices()
    }

    pub fn as_str(&self) -> &'src str {
        &self.text[self.start..self.end]
    }

    pub fn to_owned_string(&self) -> String {
        self.as_str().to_owned()
    }

    fn floor_boundary(&self, mut offset: usize) -> usize {
        while offset > self.start && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl fmt::Display for TextSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, start: usize, end: usize) -> TextSpan<'_> {
        TextSpan::from(text).slice_to(start, end)
    }

    #[test]
    fn whole_span_matches_text() {
        let s = TextSpan::from("foo");
        assert_eq!(s.as_str(), "foo");
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn slices_off_either_end() {
        assert_eq!(TextSpan::from("foo").slice(1).as_str(), "oo");
        assert_eq!(span("foo", 0, 2).as_str(), "fo");
        assert_eq!(span("abc", 1, 2).as_str(), "b");
    }

    #[test]
    fn slices_of_slices_are_relative() {
        let parent = span("abcdef", 1, 5);
        assert_eq!(parent.slice(1).as_str(), "cde");
        assert_eq!(parent.slice_to(0, 3).as_str(), "bcd");
        assert_eq!(parent.slice_to(1, 3).as_str(), "cd");
    }

    #[test]
    fn slicing_never_extends_past_parent() {
        let parent = span("abcdef", 1, 5);
        assert_eq!(parent.slice_to(0, 5).as_str(), "bcde");
        assert_eq!(parent.slice_to(1, 5).as_str(), "cde");
        assert!(parent.slice(10).is_empty());
    }

    #[test]
    fn indexes_within_bounds_only() {
        let s = span("abcdef", 1, 5);
        for (i, c) in "bcde".chars().enumerate() {
            assert_eq!(s.at(i).unwrap(), c);
        }
        assert!(matches!(s.at(4), Err(RowError::Index { index: 4, len: 4 })));
    }

    #[test]
    fn huge_indexes_fail_without_overflowing() {
        let s = TextSpan::from("abc").slice(1);
        assert_eq!(s.at(usize::MAX), Err(RowError::Index { index: usize::MAX, len: 2 }));
        assert_eq!(s.at(1), Ok('c'));
    }

    #[test]
    fn head_and_tail_respect_multibyte_chars() {
        let s = TextSpan::from("試a");
        assert_eq!(s.head_char(), Some('試'));
        assert_eq!(s.tail().as_str(), "a");
        assert_eq!(s.tail().tail().head_char(), None);
        // mid-char offsets snap back to the char start
        assert_eq!(s.slice(1).as_str(), "試a");
        assert!(s.at(1).is_err());
    }
}
