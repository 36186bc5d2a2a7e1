//! hkanno toolchain core library.
//!
//! Parses, formats, and checks hkanno annotation lines: the line-oriented
//! text that animation tools extract from Havok animation assets. The main
//! entry points are [`parse_line`] / [`parse_line_extended`] for single
//! lines, [`format_document`] for canonical output, [`validate_document`]
//! for diagnostics, and [`parse_document`] for the whole-file track model.

#![warn(missing_docs)]

/// Native payload-instruction catalog.
pub mod catalog;
/// Whole-file hkanno v2 document model.
pub mod document;
/// Annotation line grammar: cursor, node types, parsers, and formatter.
pub mod grammar;
/// Diagnostics for parsed lines and documents.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{
    Dispatch, classify, parse_as, parse_line, parse_line_extended, parse_line_with,
};

// Nodes
pub use grammar::ast::{
    CommentLine, Field, FieldValue, IframeLine, Instruction, InstructionPrefix, MotionLine, Node,
    NodeKind, ParameterItem, Parameters, PayloadInstructionLine, RotationLine, TextLine,
    TrackNameLine, Whitespace,
};

// Formatter
pub use grammar::emit::{
    FormatConfig, format_document, format_document_with, format_line, format_node,
};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Validator
pub use validate::{ValidationResult, validate_document, validate_line};

// Document model
pub use document::{Annotation, AnnotationTrack, DocumentResult, Hkanno, parse_document};

// Serialization helpers
pub use grammar::dump::to_pretty_json;

// Profiles
pub use hkanno_profile::Profile;
