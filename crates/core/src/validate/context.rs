use crate::grammar::diag::{Diagnostic, Span};
use hkanno_profile::Profile;

/// Per-line state threaded through the node checks.
///
/// `column` follows the parser's cursor: after each consumed field it is
/// moved to that field's end, so a missing field can be reported as an
/// empty span at the place it was expected.
pub(super) struct LineCtx<'a> {
    pub(super) line: usize,
    pub(super) column: usize,
    pub(super) profile: &'a Profile,
    pub(super) issues: Vec<Diagnostic>,
}

impl<'a> LineCtx<'a> {
    pub(super) fn new(line: usize, profile: &'a Profile) -> Self {
        Self {
            line,
            column: 1,
            profile,
            issues: Vec::new(),
        }
    }

    /// Move past a consumed field, if present.
    pub(super) fn advance(&mut self, span: Option<Span>) {
        if let Some(s) = span {
            self.column = s.end_column;
        }
    }

    /// Empty span at the current position.
    pub(super) fn here(&self) -> Span {
        Span::empty(self.line, self.column)
    }

    pub(super) fn push(&mut self, diagnostic: Diagnostic) {
        self.issues.push(diagnostic);
    }
}
