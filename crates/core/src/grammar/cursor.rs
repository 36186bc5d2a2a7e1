//! Per-line parser state and the primitive field parsers.
//!
//! A [`Cursor`] is created by one parse call and dropped when it returns.
//! Its position only moves forward. Every primitive is total: on a miss it
//! returns an absent result and leaves the cursor where it was; on a hit it
//! advances over exactly the characters it accepted.

use super::ast::{Field, Whitespace};
use hkanno_diagnostics::Span;

/// Forward-only cursor over the characters of a single line.
#[derive(Debug)]
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line_number: usize,
}

impl Cursor {
    /// Start a cursor at the beginning of `text`, which is line `line_number` (1-based).
    pub fn new(text: &str, line_number: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line_number,
        }
    }

    /// Current 0-based char offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Line number every produced span is tagged with.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Whether the whole line has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// The character under the cursor.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn char_at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn is_digit_at(&self, i: usize) -> bool {
        self.char_at(i).is_some_and(|c| c.is_ascii_digit())
    }

    fn span_to(&self, start: usize, end: usize) -> Span {
        Span::from_offsets(self.line_number, start, end)
    }

    fn take(&mut self, end: usize) -> (String, Span) {
        let start = self.pos;
        let text: String = self.chars[start..end].iter().collect();
        self.pos = end;
        (text, self.span_to(start, end))
    }

    /// Consume a run of whitespace. Returns `None` when the cursor is not on whitespace.
    pub fn consume_whitespace(&mut self) -> Option<Whitespace> {
        let mut end = self.pos;
        while self.char_at(end).is_some_and(char::is_whitespace) {
            end += 1;
        }
        if end == self.pos {
            return None;
        }
        let (text, span) = self.take(end);
        Some(Whitespace { text, span })
    }

    /// Match `expected` at the cursor, ignoring ASCII case.
    ///
    /// The returned field carries the text as spelled in the source.
    pub fn consume_literal(&mut self, expected: &str) -> Field<String> {
        let mut end = self.pos;
        for want in expected.chars() {
            match self.char_at(end) {
                Some(got) if got.eq_ignore_ascii_case(&want) => end += 1,
                _ => return Field::absent(),
            }
        }
        if end == self.pos {
            return Field::absent();
        }
        let (text, span) = self.take(end);
        Field::present(text, span)
    }

    /// Consume a numeral: `[+-]? digits ('.' digits)? ([eE] [+-]? digits)?`.
    ///
    /// Nothing is consumed unless the integer digit run is non-empty. A `.` or
    /// exponent marker is only taken together with the digits after it.
    /// Numerals too large for `f64` decode to a signed infinity.
    pub fn consume_number(&mut self) -> Field<f64> {
        let start = self.pos;
        let mut i = start;
        if matches!(self.char_at(i), Some('+' | '-')) {
            i += 1;
        }
        let int_start = i;
        while self.is_digit_at(i) {
            i += 1;
        }
        if i == int_start {
            return Field::absent();
        }
        if self.char_at(i) == Some('.') && self.is_digit_at(i + 1) {
            i += 1;
            while self.is_digit_at(i) {
                i += 1;
            }
        }
        if matches!(self.char_at(i), Some('e' | 'E')) {
            let mut j = i + 1;
            if matches!(self.char_at(j), Some('+' | '-')) {
                j += 1;
            }
            let exp_digits = j;
            while self.is_digit_at(j) {
                j += 1;
            }
            if j > exp_digits {
                i = j;
            }
        }
        let (text, span) = self.take(i);
        Field {
            value: text.parse::<f64>().ok(),
            span: Some(span),
        }
    }

    /// Consume everything up to the next char in `stop` (or end of line).
    pub fn consume_until(&mut self, stop: &[char]) -> Field<String> {
        let end = self.scan_until(stop);
        if end == self.pos {
            return Field::absent();
        }
        let (text, span) = self.take(end);
        Field::present(text, span)
    }

    /// Like [`consume_until`](Self::consume_until), but when the run reaches
    /// end of line its trailing whitespace is left unconsumed.
    pub fn consume_until_trimmed(&mut self, stop: &[char]) -> Field<String> {
        let mut end = self.scan_until(stop);
        if end == self.chars.len() {
            while end > self.pos && self.chars[end - 1].is_whitespace() {
                end -= 1;
            }
        }
        if end == self.pos {
            return Field::absent();
        }
        let (text, span) = self.take(end);
        Field::present(text, span)
    }

    /// Consume a single character if it is one of `set`.
    pub fn consume_one_of(&mut self, set: &[char]) -> Option<(char, Span)> {
        let c = self.peek().filter(|c| set.contains(c))?;
        let (_, span) = self.take(self.pos + 1);
        Some((c, span))
    }

    fn scan_until(&self, stop: &[char]) -> usize {
        let mut end = self.pos;
        while let Some(c) = self.char_at(end) {
            if stop.contains(&c) {
                break;
            }
            end += 1;
        }
        end
    }
}
