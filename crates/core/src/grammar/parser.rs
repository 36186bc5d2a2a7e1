use super::{
    ast::{CommentLine, MotionLine, Node, NodeKind, RotationLine, TextLine, TrackNameLine},
    cursor::Cursor,
    json_field::parse_iframe,
    payload::parse_payload_instruction,
};

// ─── Line markers ───────────────────────────────────────────────────────────

/// Comment marker.
pub const COMMENT_MARKER: &str = "#";
/// Track name declaration keyword.
pub const TRACK_NAME_KEYWORD: &str = "trackName:";
/// Root motion event keyword.
pub const MOTION_EVENT: &str = "animmotion";
/// Root rotation event keyword.
pub const ROTATION_EVENT: &str = "animrotation";
/// Invincibility-frame event keyword.
pub const IFRAME_EVENT: &str = "SpecialFrames_Invincible";
/// Default payload-interpreter host.
pub const PAYLOAD_HOST: &str = "PIE";

/// Lowercase substring that routes a line to the payload-instruction parser.
const PAYLOAD_DISPATCH_MARKER: &str = "pie.";

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// Which set of line kinds the dispatcher may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    /// Comment, track name, motion, rotation, and text.
    #[default]
    Lenient,
    /// Everything in [`Dispatch::Lenient`], plus iframe and payload-instruction lines.
    Extended,
}

/// Decide which node parser handles `text`.
///
/// Markers are matched case-insensitively; the first match wins.
pub fn classify(text: &str, dispatch: Dispatch) -> NodeKind {
    let lower = text.to_ascii_lowercase();
    if dispatch == Dispatch::Extended {
        if lower.contains(&IFRAME_EVENT.to_ascii_lowercase()) {
            return NodeKind::Iframe;
        }
        if lower.contains(PAYLOAD_DISPATCH_MARKER) {
            return NodeKind::PayloadInstruction;
        }
    }
    let trimmed = lower.trim();
    if trimmed.starts_with(COMMENT_MARKER) {
        NodeKind::Comment
    } else if trimmed.starts_with(&TRACK_NAME_KEYWORD.to_ascii_lowercase()) {
        NodeKind::TrackName
    } else if lower.contains(ROTATION_EVENT) {
        NodeKind::Rotation
    } else if lower.contains(MOTION_EVENT) {
        NodeKind::Motion
    } else {
        NodeKind::Text
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse one annotation line with the lenient dispatcher.
///
/// Total: every input produces a node. `line_number` (1-based) is copied
/// into every span.
pub fn parse_line(text: &str, line_number: usize) -> Node {
    parse_line_with(text, line_number, Dispatch::Lenient)
}

/// Parse one annotation line with the extended dispatcher, which also
/// recognizes iframe and payload-instruction lines.
pub fn parse_line_extended(text: &str, line_number: usize) -> Node {
    parse_line_with(text, line_number, Dispatch::Extended)
}

/// Parse one annotation line with an explicit dispatcher.
pub fn parse_line_with(text: &str, line_number: usize, dispatch: Dispatch) -> Node {
    let kind = classify(text, dispatch);
    log::trace!(line_number, kind:% = kind, dispatch:?; "Dispatched annotation line");
    parse_as(kind, text, line_number)
}

/// Run the node parser for `kind` on `text`, bypassing dispatch.
pub fn parse_as(kind: NodeKind, text: &str, line_number: usize) -> Node {
    let mut cur = Cursor::new(text, line_number);
    match kind {
        NodeKind::Comment => Node::Comment(parse_comment(&mut cur)),
        NodeKind::TrackName => Node::TrackName(parse_track_name(&mut cur)),
        NodeKind::Text => Node::Text(parse_text(&mut cur)),
        NodeKind::Motion => Node::Motion(parse_motion(&mut cur)),
        NodeKind::Rotation => Node::Rotation(parse_rotation(&mut cur)),
        NodeKind::Iframe => Node::Iframe(parse_iframe(&mut cur)),
        NodeKind::PayloadInstruction => {
            Node::PayloadInstruction(parse_payload_instruction(&mut cur))
        }
    }
}

// ─── Node parsers ───────────────────────────────────────────────────────────
//
// Each parser attempts every field exactly once, in order. A missing field
// never stops the sequence; later fields are tried at the same position.

fn parse_comment(cur: &mut Cursor) -> CommentLine {
    CommentLine {
        leading: cur.consume_whitespace(),
        marker: cur.consume_literal(COMMENT_MARKER),
        space: cur.consume_whitespace(),
        comment: cur.consume_until_trimmed(&[]),
        trailing: cur.consume_whitespace(),
    }
}

fn parse_track_name(cur: &mut Cursor) -> TrackNameLine {
    TrackNameLine {
        leading: cur.consume_whitespace(),
        keyword: cur.consume_literal(TRACK_NAME_KEYWORD),
        space: cur.consume_whitespace(),
        name: cur.consume_until_trimmed(&[]),
        trailing: cur.consume_whitespace(),
    }
}

fn parse_text(cur: &mut Cursor) -> TextLine {
    TextLine {
        leading: cur.consume_whitespace(),
        time: cur.consume_number(),
        space_time_to_event: cur.consume_whitespace(),
        event: cur.consume_until_trimmed(&[]),
        trailing: cur.consume_whitespace(),
    }
}

fn parse_motion(cur: &mut Cursor) -> MotionLine {
    MotionLine {
        leading: cur.consume_whitespace(),
        time: cur.consume_number(),
        space_time_to_event: cur.consume_whitespace(),
        event: cur.consume_literal(MOTION_EVENT),
        space_event_to_x: cur.consume_whitespace(),
        x: cur.consume_number(),
        space_x_to_y: cur.consume_whitespace(),
        y: cur.consume_number(),
        space_y_to_z: cur.consume_whitespace(),
        z: cur.consume_number(),
        trailing: cur.consume_whitespace(),
        unparsed: cur.consume_until(&[]),
    }
}

fn parse_rotation(cur: &mut Cursor) -> RotationLine {
    RotationLine {
        leading: cur.consume_whitespace(),
        time: cur.consume_number(),
        space_time_to_event: cur.consume_whitespace(),
        event: cur.consume_literal(ROTATION_EVENT),
        space_event_to_degrees: cur.consume_whitespace(),
        degrees: cur.consume_number(),
        trailing: cur.consume_whitespace(),
        unparsed: cur.consume_until(&[]),
    }
}
