//! Invincibility-frame lines and their embedded JSON payload.
//!
//! The payload runs from after the event keyword (and optional padding) to
//! end of line, trailing whitespace excluded. A decode failure is not an
//! error at this level: the value is left absent and the decoder message is
//! kept on the node for the validator to report.

use super::{
    ast::{Field, IframeLine},
    cursor::Cursor,
    parser::IFRAME_EVENT,
};
use hkanno_diagnostics::Span;

/// Result of decoding a raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    /// The decoded value; absent when the raw text is missing or invalid.
    pub value: Field<serde_json::Value>,
    /// Decoder message when the raw text is present but not valid JSON.
    pub error: Option<String>,
}

/// Decode the raw payload text read from `span`.
///
/// An absent raw payload yields an absent value and no error.
pub fn decode_payload(raw: Option<&str>, span: Option<Span>) -> DecodedPayload {
    let Some(raw) = raw else {
        return DecodedPayload {
            value: Field::absent(),
            error: None,
        };
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => DecodedPayload {
            value: Field {
                value: Some(value),
                span,
            },
            error: None,
        },
        Err(e) => DecodedPayload {
            value: Field { value: None, span },
            error: Some(e.to_string()),
        },
    }
}

pub(crate) fn parse_iframe(cur: &mut Cursor) -> IframeLine {
    let leading = cur.consume_whitespace();
    let time = cur.consume_number();
    let space_time_to_event = cur.consume_whitespace();
    let event = cur.consume_literal(IFRAME_EVENT);
    let space_event_to_payload = cur.consume_whitespace();
    let raw_payload = cur.consume_until_trimmed(&[]);
    let decoded = decode_payload(raw_payload.as_str(), raw_payload.span);
    IframeLine {
        leading,
        time,
        space_time_to_event,
        event,
        space_event_to_payload,
        raw_payload,
        payload: decoded.value,
        parse_error: decoded.error,
        trailing: cur.consume_whitespace(),
    }
}
