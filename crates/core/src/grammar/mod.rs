/// Annotation line node types.
pub mod ast;
/// Forward-only cursor and primitive field parsers.
pub mod cursor;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for parsed nodes.
pub mod dump;
/// Formatter: converts nodes back to canonical annotation text.
pub mod emit;
/// Invincibility-frame lines and their embedded JSON payload.
pub mod json_field;
/// Line dispatcher and node parsers.
pub mod parser;
/// Payload-instruction sub-grammar.
pub mod payload;
