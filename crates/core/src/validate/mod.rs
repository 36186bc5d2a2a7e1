//! Diagnostics for parsed annotation lines.
//!
//! The parser never fails; this module turns absent fields, decode failures,
//! and catalog mismatches into [`Diagnostic`]s with spans and key/value
//! context.

pub use crate::grammar::diag::Diagnostic;
use crate::grammar::{
    ast::{Node, NodeKind},
    diag::{Span, codes},
    parser::parse_line_extended,
};
use hkanno_profile::Profile;
use serde::Serialize;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("instruction" => name, "expected" => arity.to_string())
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

mod context;
mod events;
mod iframe;
mod payload;

use context::LineCtx;

/// Result of validating a document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no errors were found (warnings and info are allowed).
    pub ok: bool,
    /// All diagnostics produced during validation, in line order.
    pub issues: Vec<Diagnostic>,
}

/// Check one parsed line. `line_number` must be the number the node was parsed with.
///
/// A node parsed from a blank line produces no diagnostics.
pub fn validate_line(node: &Node, line_number: usize, profile: &Profile) -> Vec<Diagnostic> {
    let mut cx = LineCtx::new(line_number, profile);
    match node {
        Node::Comment(_) => {}
        Node::TrackName(n) => events::check_track_name(&mut cx, n),
        Node::Text(n) => {
            if n.time.is_present() || n.event.is_present() {
                events::check_text(&mut cx, n);
            }
        }
        Node::Motion(n) => events::check_motion(&mut cx, n),
        Node::Rotation(n) => events::check_rotation(&mut cx, n),
        Node::Iframe(n) => iframe::check_iframe(&mut cx, n),
        Node::PayloadInstruction(n) => payload::check_payload_instruction(&mut cx, n),
    }
    log::trace!(line_number, kind:% = node.kind(), issues = cx.issues.len(); "Validated line");
    cx.issues
}

/// Parse every line with the extended dispatcher and check it, plus
/// document-level structure.
///
/// When no profile is given, [`Profile::default`] is used.
pub fn validate_document(text: &str, profile: Option<&Profile>) -> ValidationResult {
    let default_profile;
    let profile = match profile {
        Some(p) => p,
        None => {
            default_profile = Profile::default();
            &default_profile
        }
    };

    let nodes: Vec<(usize, Node)> = text
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, parse_line_extended(line, i + 1)))
        .collect();

    let mut issues = Vec::new();
    let has_tracks = nodes.iter().any(|(_, n)| n.kind() == NodeKind::TrackName);
    let mut in_track = false;
    for (line_number, node) in &nodes {
        match node.kind() {
            NodeKind::TrackName => in_track = true,
            NodeKind::Comment => {}
            _ if has_tracks && !in_track => {
                issues.push(annotation_before_track(node, *line_number));
            }
            _ => {}
        }
        issues.extend(validate_line(node, *line_number, profile));
    }

    let ok = !issues
        .iter()
        .any(|d| d.severity == crate::grammar::diag::Severity::Error);
    log::debug!(lines = nodes.len(), issues = issues.len(), ok; "Validated document");
    ValidationResult { ok, issues }
}

fn annotation_before_track(node: &Node, line_number: usize) -> Diagnostic {
    let span = node
        .time()
        .and_then(|t| t.span)
        .unwrap_or_else(|| Span::empty(line_number, 1));
    Diagnostic::with_default_severity(
        codes::DOCUMENT_ANNOTATION_BEFORE_TRACK,
        "annotation appears before the first `trackName:` declaration",
        Some(span),
    )
    .with_context(ctx!("kind" => node.kind().as_str()))
}
