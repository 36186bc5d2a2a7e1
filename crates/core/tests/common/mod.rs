//! Shared test helpers for `hkanno_core` integration tests.

#![allow(unreachable_pub)]

use hkanno_core::grammar::ast::{
    CommentLine, IframeLine, MotionLine, Node, PayloadInstructionLine, RotationLine, TextLine,
};
use hkanno_core::grammar::parser::{parse_line, parse_line_extended};
use hkanno_diagnostics::{Diagnostic, Span};
use hkanno_profile::Profile;

// ─── Node helpers ────────────────────────────────────────────────────────────

#[allow(dead_code)]
pub fn comment(line: &str) -> CommentLine {
    match parse_line(line, 1) {
        Node::Comment(n) => n,
        other => panic!("expected comment for {line:?}, got {}", other.kind()),
    }
}

#[allow(dead_code)]
pub fn text(line: &str) -> TextLine {
    match parse_line(line, 1) {
        Node::Text(n) => n,
        other => panic!("expected text for {line:?}, got {}", other.kind()),
    }
}

#[allow(dead_code)]
pub fn motion(line: &str) -> MotionLine {
    match parse_line(line, 1) {
        Node::Motion(n) => n,
        other => panic!("expected motion for {line:?}, got {}", other.kind()),
    }
}

#[allow(dead_code)]
pub fn rotation(line: &str) -> RotationLine {
    match parse_line(line, 1) {
        Node::Rotation(n) => n,
        other => panic!("expected rotation for {line:?}, got {}", other.kind()),
    }
}

#[allow(dead_code)]
pub fn iframe(line: &str) -> IframeLine {
    match parse_line_extended(line, 1) {
        Node::Iframe(n) => n,
        other => panic!("expected iframe for {line:?}, got {}", other.kind()),
    }
}

#[allow(dead_code)]
pub fn payload(line: &str) -> PayloadInstructionLine {
    match parse_line_extended(line, 1) {
        Node::PayloadInstruction(n) => n,
        other => panic!("expected payload_instruction for {line:?}, got {}", other.kind()),
    }
}

/// `(start_column, end_column)` of a span that must be present.
#[allow(dead_code)]
pub fn cols(span: Option<Span>) -> (usize, usize) {
    let s = span.expect("expected a span");
    (s.start_column, s.end_column)
}

// ─── Diagnostic helpers ──────────────────────────────────────────────────────

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}, got {:?}", ids(issues)))
}

/// Diagnostic ids, in order.
#[allow(dead_code)]
pub fn ids(issues: &[Diagnostic]) -> Vec<String> {
    issues.iter().map(|d| d.id.to_string()).collect()
}

#[allow(dead_code)]
pub fn has_diag(issues: &[Diagnostic], code: &str) -> bool {
    issues.iter().any(|d| &*d.id == code)
}

// ─── Profile fixture helpers ─────────────────────────────────────────────────

#[allow(dead_code)]
pub fn profile_from_json(json: &str) -> Profile {
    Profile::from_json(json).expect("invalid profile JSON in test fixture")
}
