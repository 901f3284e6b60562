//! Cursor over a source string.
//!
//! The walker owns no text; it borrows the source for its whole life, so
//! every slice it hands out (`ahead`, `advance`, the `match_*` family) lives
//! as long as the source itself. Positions are byte offsets that always fall
//! on a character boundary; movement is measured in characters.

use crate::character::{is_newline, is_printable};
use crate::Token;

/// A cursor over a source string with line and column tracking.
///
/// `line` and `column` are 0-based. The line counter advances on any newline
/// character, with a CR LF pair counting once (the LF carries the newline).
/// The column counter only advances over printable characters, so tabs and
/// control characters do not move it.
///
/// All movement is clamped at the ends of the source; no walker operation
/// panics or fails.
///
/// # Example
///
/// ```
/// use craftc_walk::Walker;
///
/// let mut walker = Walker::new("namespace demo");
/// assert_eq!(walker.advance(9), "namespace");
/// assert_eq!(walker.ahead(5), " demo");
/// assert_eq!(walker.pos(), 9);
/// ```
#[derive(Debug)]
pub struct Walker<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Walker<'a> {
    /// Creates a walker positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Walker {
            source,
            pos: 0,
            line: 0,
            column: 0,
        }
    }

    /// The full source being traversed.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The 0-based line number at the current position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 0-based column number at the current position.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns true if the cursor is at the end of the source.
    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The character at the cursor, or `None` at end of input.
    pub fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// A token spanning from `start` to the current position.
    pub fn token(&self, start: usize) -> Token<'a> {
        Token::new(self.source, start, self.pos)
    }

    /// Moves the cursor to `target`, re-deriving line and column from the
    /// characters crossed.
    ///
    /// `target` is clamped to the source length and must lie on a character
    /// boundary. Moving backwards across a line break recomputes the column
    /// by scanning to the start of the destination line.
    pub fn set_pos(&mut self, target: usize) {
        let target = target.min(self.source.len());
        debug_assert!(self.source.is_char_boundary(target));

        while self.pos < target {
            let Some(c) = self.source[self.pos..].chars().next() else {
                break;
            };
            let next = self.pos + c.len_utf8();
            if is_printable(c) {
                self.column += 1;
            }
            if is_newline(c) && !(c == '\r' && self.source[next..].starts_with('\n')) {
                self.line += 1;
                self.column = 0;
            }
            self.pos = next;
        }

        // Moving backwards: once a line break is crossed the column is
        // unknown until we rescan the destination line.
        let mut column_stale = false;
        while self.pos > target {
            let Some(c) = self.source[..self.pos].chars().next_back() else {
                break;
            };
            if !column_stale && is_printable(c) {
                self.column = self.column.saturating_sub(1);
            }
            if is_newline(c) && !(c == '\r' && self.source[self.pos..].starts_with('\n')) {
                self.line = self.line.saturating_sub(1);
                column_stale = true;
            }
            self.pos -= c.len_utf8();
        }

        if column_stale {
            self.column = 0;
            let mut p = self.pos;
            while let Some(c) = self.source[..p].chars().next_back() {
                if is_newline(c) && !(c == '\r' && self.source[p..].starts_with('\n')) {
                    break;
                }
                p -= c.len_utf8();
                if is_printable(c) {
                    self.column += 1;
                }
            }
        }
    }

    /// Looks ahead `count` characters without moving, returning them as a
    /// slice. Shorter than `count` characters if the end of input is reached.
    pub fn ahead(&self, count: usize) -> &'a str {
        let mut end = self.pos;
        let mut chars = self.source[self.pos..].chars();
        for _ in 0..count {
            match chars.next() {
                Some(c) => end += c.len_utf8(),
                None => break,
            }
        }
        &self.source[self.pos..end]
    }

    /// Looks behind `count` characters without moving, returning them as a
    /// slice. Shorter than `count` characters if the start is reached.
    pub fn behind(&self, count: usize) -> &'a str {
        let mut start = self.pos;
        let mut chars = self.source[..self.pos].chars();
        for _ in 0..count {
            match chars.next_back() {
                Some(c) => start -= c.len_utf8(),
                None => break,
            }
        }
        &self.source[start..self.pos]
    }

    /// Advances by up to `count` characters, returning the traversed slice.
    pub fn advance(&mut self, count: usize) -> &'a str {
        let result = self.ahead(count);
        self.set_pos(self.pos + result.len());
        result
    }

    /// Retreats by up to `count` characters, returning the traversed slice.
    pub fn retreat(&mut self, count: usize) -> &'a str {
        let result = self.behind(count);
        self.set_pos(self.pos - result.len());
        result
    }

    /// Matches a literal string at the cursor.
    ///
    /// On success the cursor advances past the match and the matched slice
    /// is returned; on failure the cursor does not move and `None` is
    /// returned.
    ///
    /// # Example
    ///
    /// ```
    /// use craftc_walk::Walker;
    ///
    /// let mut walker = Walker::new("namespace demo");
    /// assert_eq!(walker.match_str("namespace"), Some("namespace"));
    /// assert_eq!(walker.match_str("namespace"), None);
    /// assert_eq!(walker.pos(), 9);
    /// ```
    pub fn match_str(&mut self, pattern: &str) -> Option<&'a str> {
        if self.source[self.pos..].starts_with(pattern) {
            let start = self.pos;
            self.set_pos(start + pattern.len());
            Some(&self.source[start..start + pattern.len()])
        } else {
            None
        }
    }

    /// Matches characters while a predicate holds.
    ///
    /// The predicate is called for each character in turn: `Some(true)`
    /// keeps going, `Some(false)` stops and the traversed slice (possibly
    /// empty) is returned, and `None` aborts the whole match, restoring the
    /// cursor and returning `None`. End of input stops the match.
    pub fn match_pred(&mut self, mut pred: impl FnMut(char) -> Option<bool>) -> Option<&'a str> {
        let initial = self.pos;
        while let Some(c) = self.peek_char() {
            match pred(c) {
                Some(true) => self.set_pos(self.pos + c.len_utf8()),
                Some(false) => break,
                None => {
                    self.set_pos(initial);
                    return None;
                }
            }
        }
        Some(&self.source[initial..self.pos])
    }

    /// Like [`match_pred`](Walker::match_pred), but the predicate also
    /// receives the 0-based character offset into the match, for "first
    /// character vs continuation" distinctions.
    pub fn match_offset(
        &mut self,
        mut pred: impl FnMut(usize, char) -> Option<bool>,
    ) -> Option<&'a str> {
        let initial = self.pos;
        let mut offset = 0;
        while let Some(c) = self.peek_char() {
            match pred(offset, c) {
                Some(true) => {
                    self.set_pos(self.pos + c.len_utf8());
                    offset += 1;
                }
                Some(false) => break,
                None => {
                    self.set_pos(initial);
                    return None;
                }
            }
        }
        Some(&self.source[initial..self.pos])
    }
}
