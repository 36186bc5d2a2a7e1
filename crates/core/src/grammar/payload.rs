//! Payload-instruction sub-grammar.
//!
//! ```text
//! <time> <ws> <host> "." <prefix> <name> ("|" <value>)*
//! ```
//!
//! The host is everything up to the first `.`. An instruction is only parsed
//! when one of the prefix characters follows the `.`; otherwise the remainder
//! of the line is kept as `unparsed`.

use super::{
    ast::{Field, Instruction, InstructionPrefix, ParameterItem, Parameters, PayloadInstructionLine},
    cursor::Cursor,
};

/// Separator between an instruction name and each of its parameters.
pub const PARAMETER_SEPARATOR: char = '|';
/// Separator between host and instruction.
pub const HOST_SEPARATOR: char = '.';

pub(crate) fn parse_payload_instruction(cur: &mut Cursor) -> PayloadInstructionLine {
    let leading = cur.consume_whitespace();
    let time = cur.consume_number();
    let space_time_to_event = cur.consume_whitespace();
    let event = cur.consume_until_trimmed(&[HOST_SEPARATOR]);
    let dot = cur.consume_literal(".");

    let mut instruction = None;
    let mut unparsed = Field::absent();
    if dot.is_present() {
        if cur
            .peek()
            .is_some_and(|c| InstructionPrefix::from_char(c).is_some())
        {
            instruction = Some(parse_instruction(cur));
        } else {
            unparsed = cur.consume_until_trimmed(&[]);
        }
    }

    PayloadInstructionLine {
        leading,
        time,
        space_time_to_event,
        event,
        dot,
        instruction,
        trailing: cur.consume_whitespace(),
        unparsed,
    }
}

fn parse_instruction(cur: &mut Cursor) -> Instruction {
    let prefix = match cur.consume_one_of(&InstructionPrefix::CHARS) {
        Some((c, span)) => Field {
            value: InstructionPrefix::from_char(c),
            span: Some(span),
        },
        None => Field::absent(),
    };
    let name = cur.consume_until_trimmed(&[PARAMETER_SEPARATOR]);
    let parameters =
        (cur.peek() == Some(PARAMETER_SEPARATOR)).then(|| parse_parameters(cur));
    Instruction {
        prefix,
        name,
        parameters,
    }
}

fn parse_parameters(cur: &mut Cursor) -> Parameters {
    let mut items = Vec::new();
    while cur.peek() == Some(PARAMETER_SEPARATOR) {
        let separator = cur.consume_literal("|");
        let value = cur.consume_until_trimmed(&[PARAMETER_SEPARATOR]);
        items.push(ParameterItem { separator, value });
    }
    Parameters { items }
}
