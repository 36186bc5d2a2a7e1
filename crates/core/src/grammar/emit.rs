//! Formatter: converts parsed nodes back into canonical annotation text.
//!
//! Padding is dropped, mandatory separators become exactly one space, numbers
//! render with six fractional digits, and free text (including the iframe
//! payload and any unparsed remainder) is kept verbatim. Formatting a
//! document re-parses every line independently, so the output has the same
//! number of lines and formatting it again is a no-op.

use super::{
    ast::{
        CommentLine, Field, IframeLine, Instruction, MotionLine, NEGATIVE_OVERFLOW, Node,
        POSITIVE_OVERFLOW, PayloadInstructionLine, RotationLine, TextLine, TrackNameLine,
    },
    parser::{Dispatch, parse_line_with},
};

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for document formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatConfig {
    /// Dispatcher used to re-parse each line.
    pub dispatch: Dispatch,
}

// ── Public API ──────────────────────────────────────────────────────────

/// Format a whole document with the lenient dispatcher.
pub fn format_document(text: &str) -> String {
    format_document_with(text, &FormatConfig::default())
}

/// Format a whole document.
///
/// Splits on `\n`, formats each line on its own and joins with `\n`.
pub fn format_document_with(text: &str, config: &FormatConfig) -> String {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| format_line(line, i + 1, config))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse and format a single line. Blank lines format to the empty string.
pub fn format_line(text: &str, line_number: usize, config: &FormatConfig) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    format_node(&parse_line_with(text, line_number, config.dispatch))
}

/// Render a node as canonical text.
pub fn format_node(node: &Node) -> String {
    let mut out = String::new();
    match node {
        Node::Comment(n) => emit_comment(&mut out, n),
        Node::TrackName(n) => emit_track_name(&mut out, n),
        Node::Text(n) => emit_text(&mut out, n),
        Node::Motion(n) => emit_motion(&mut out, n),
        Node::Rotation(n) => emit_rotation(&mut out, n),
        Node::Iframe(n) => emit_iframe(&mut out, n),
        Node::PayloadInstruction(n) => emit_payload_instruction(&mut out, n),
    }
    if out.trim().is_empty() {
        out.clear();
    }
    out
}

/// Render a number field: six fractional digits, or empty when absent.
pub fn format_number(field: &Field<f64>) -> String {
    match field.value {
        None => String::new(),
        Some(v) if v == f64::INFINITY => POSITIVE_OVERFLOW.to_string(),
        Some(v) if v == f64::NEG_INFINITY => NEGATIVE_OVERFLOW.to_string(),
        Some(v) => format!("{v:.6}"),
    }
}

// ── Per-kind emission ───────────────────────────────────────────────────

fn push_text(out: &mut String, field: &Field<String>) {
    if let Some(s) = field.as_str() {
        out.push_str(s);
    }
}

fn push_number(out: &mut String, field: &Field<f64>) {
    out.push_str(&format_number(field));
}

fn push_separator(out: &mut String) {
    out.push(' ');
}

fn emit_comment(out: &mut String, n: &CommentLine) {
    push_text(out, &n.marker);
    if n.comment.is_present() {
        push_separator(out);
        push_text(out, &n.comment);
    }
}

fn emit_track_name(out: &mut String, n: &TrackNameLine) {
    push_text(out, &n.keyword);
    if n.name.is_present() {
        push_separator(out);
        push_text(out, &n.name);
    }
}

fn emit_text(out: &mut String, n: &TextLine) {
    push_number(out, &n.time);
    push_separator(out);
    push_text(out, &n.event);
}

fn emit_motion(out: &mut String, n: &MotionLine) {
    push_number(out, &n.time);
    push_separator(out);
    push_text(out, &n.event);
    push_separator(out);
    push_number(out, &n.x);
    push_separator(out);
    push_number(out, &n.y);
    push_separator(out);
    push_number(out, &n.z);
    emit_unparsed(out, &n.unparsed);
}

fn emit_rotation(out: &mut String, n: &RotationLine) {
    push_number(out, &n.time);
    push_separator(out);
    push_text(out, &n.event);
    push_separator(out);
    push_number(out, &n.degrees);
    emit_unparsed(out, &n.unparsed);
}

fn emit_unparsed(out: &mut String, unparsed: &Field<String>) {
    if let Some(rest) = unparsed.as_str() {
        push_separator(out);
        out.push_str(rest.trim_end());
    }
}

fn emit_iframe(out: &mut String, n: &IframeLine) {
    push_number(out, &n.time);
    push_separator(out);
    push_text(out, &n.event);
    push_text(out, &n.raw_payload);
}

fn emit_payload_instruction(out: &mut String, n: &PayloadInstructionLine) {
    push_number(out, &n.time);
    push_separator(out);
    push_text(out, &n.event);
    push_text(out, &n.dot);
    if let Some(ins) = &n.instruction {
        emit_instruction(out, ins);
    }
    push_text(out, &n.unparsed);
}

fn emit_instruction(out: &mut String, ins: &Instruction) {
    if let Some(prefix) = ins.prefix.value {
        out.push(prefix.as_char());
    }
    push_text(out, &ins.name);
    for item in ins.parameters.iter().flat_map(|p| &p.items) {
        push_text(out, &item.separator);
        push_text(out, &item.value);
    }
}
