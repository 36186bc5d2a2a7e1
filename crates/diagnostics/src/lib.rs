//! Diagnostics for the hkanno toolchain.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and [`LineIndex`] types
//! used to report errors, warnings, and informational messages from the line
//! parser, the validator, and the document model. Diagnostic codes are
//! defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from `data/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps 1-based `(line, column)` positions back to offsets in a source string.
///
/// Columns count Unicode scalar values, matching the column convention of
/// [`Span`]. Both char offsets (for renderers that index by character) and
/// byte offsets (for slicing) are available.
///
/// The index is built in O(n) time. Lookups are O(1) for the line and O(k)
/// in the column for byte offsets on lines containing multi-byte characters.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Char offset of the start of each line. `char_starts[0]` is always 0.
    char_starts: Vec<usize>,
    /// Byte offset of the start of each line. `byte_starts[0]` is always 0.
    byte_starts: Vec<usize>,
    /// Char length of each line, excluding the `\n` terminator.
    char_lens: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut char_starts = vec![0usize];
        let mut byte_starts = vec![0usize];
        let mut char_lens = Vec::new();
        let mut line_chars = 0usize;
        for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
            if c == '\n' {
                char_lens.push(line_chars);
                line_chars = 0;
                char_starts.push(char_idx + 1);
                byte_starts.push(byte_idx + 1);
            } else {
                line_chars += 1;
            }
        }
        char_lens.push(line_chars);
        Self {
            char_starts,
            byte_starts,
            char_lens,
        }
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.char_starts.len()
    }

    /// Char length of the given 1-based line, excluding the line terminator.
    ///
    /// Returns `None` if `line` is out of bounds.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.char_lens.get(line.checked_sub(1)?).copied()
    }

    /// Char offset of a 1-based `(line, column)` position.
    ///
    /// Lines past the end clamp to the last line; columns past the end of a
    /// line clamp to the line end.
    pub fn char_offset(&self, line: usize, column: usize) -> usize {
        let idx = line.saturating_sub(1).min(self.char_starts.len() - 1);
        let col = column.saturating_sub(1).min(self.char_lens[idx]);
        self.char_starts[idx] + col
    }

    /// Byte offset of a 1-based `(line, column)` position in `text`.
    ///
    /// `text` must be the same string the index was built from.
    pub fn byte_offset(&self, text: &str, line: usize, column: usize) -> usize {
        let idx = line.saturating_sub(1).min(self.byte_starts.len() - 1);
        let col = column.saturating_sub(1).min(self.char_lens[idx]);
        let start = self.byte_starts[idx];
        text[start..]
            .char_indices()
            .nth(col)
            .map_or(text.len(), |(b, _)| start + b)
    }

    /// Char range covered by `span`, clamped to the source.
    pub fn char_range(&self, span: &Span) -> Range<usize> {
        let start = self.char_offset(span.line, span.start_column);
        let end = self.char_offset(span.line, span.end_column).max(start);
        start..end
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the line is invalid.
    Error,
    /// Warning: the line may not do what the author intended.
    Warn,
    /// Informational note.
    Info,
}

/// Half-open, 1-based line/column range in the source input.
///
/// `end_column` is exclusive, so `end_column - start_column` is the number of
/// characters covered. Spans never cross lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the first character.
    pub start_column: usize,
    /// 1-based column one past the last character.
    pub end_column: usize,
}

impl Span {
    /// Create a span covering columns `[start_column, end_column)` of `line`.
    ///
    /// Panics if `end_column < start_column`.
    pub fn new(line: usize, start_column: usize, end_column: usize) -> Self {
        assert!(
            end_column >= start_column,
            "Span end ({end_column}) < start ({start_column})"
        );
        Self {
            line,
            start_column,
            end_column,
        }
    }

    /// Convert 0-based char offsets `[start, end)` on `line` into a span.
    ///
    /// Panics if `end < start`.
    pub fn from_offsets(line: usize, start: usize, end: usize) -> Self {
        Self::new(line, start + 1, end + 1)
    }

    /// Create a zero-width span at the given 1-based column.
    pub fn empty(line: usize, column: usize) -> Self {
        Self {
            line,
            start_column: column,
            end_column: column,
        }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end_column - self.start_column
    }

    /// Whether the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.end_column == self.start_column
    }

    /// Whether the 1-based `column` lies inside the span.
    pub fn contains(&self, column: usize) -> bool {
        self.start_column <= column && column < self.end_column
    }

    /// Smallest span covering both `self` and `other` (same line assumed).
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            line: self.line,
            start_column: self.start_column.min(other.start_column),
            end_column: self.end_column.max(other.end_column),
        }
    }
}

/// A diagnostic message produced by the validator or document model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"HKA1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional source range that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    /// Absent when no context is applicable. Serialized only when present.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic using the default severity declared for `id`.
    ///
    /// Unknown ids fall back to [`Severity::Warn`].
    pub fn with_default_severity(
        id: &'static str,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Warn);
        Self::new(id, severity, message, span)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"field"`, `"instruction"`, `"expected"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Override the severity (builder pattern).
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) => write!(
                f,
                "{}[{}] {}:{}: {}",
                self.severity, self.id, span.line, span.start_column, self.message
            ),
            None => write!(f, "{}[{}]: {}", self.severity, self.id, self.message),
        }
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `data/diagnostics.json` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the one-line summary for a diagnostic code, if known.
pub fn summary(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_summary.rs"))
}

/// Returns the severity a diagnostic code is reported with unless overridden.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}
