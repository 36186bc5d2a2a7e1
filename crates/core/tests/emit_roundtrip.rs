//! Formatter tests.
//!
//! Gold-standard guarantee: `format(format(x)) == format(x)` for every
//! input, with the same number of lines.

use hkanno_core::grammar::emit::{FormatConfig, format_document, format_document_with, format_node};
use hkanno_core::grammar::parser::{Dispatch, parse_line, parse_line_extended};

/// Assert that formatting is idempotent and line-count preserving under `config`.
fn assert_stable(input: &str, config: &FormatConfig) {
    let once = format_document_with(input, config);
    let twice = format_document_with(&once, config);
    assert_eq!(
        once, twice,
        "\n--- Formatting not idempotent ---\nInput:\n{input}\nOnce:\n{once}\nTwice:\n{twice}\n"
    );
    assert_eq!(
        input.split('\n').count(),
        once.split('\n').count(),
        "line count changed for {input:?}"
    );
}

fn assert_stable_both(input: &str) {
    assert_stable(input, &FormatConfig::default());
    assert_stable(
        input,
        &FormatConfig {
            dispatch: Dispatch::Extended,
        },
    );
}

const SAMPLE: &str = "\
# numOriginalFrames: 38
# duration: 1.5
# numAnnotationTracks: 1

trackName: NPC Root [Root]
# numAnnotations: 6
0.1 SoundPlay.WPNSwingUnarmed
0.2   animmotion 0 120.5   0
0.2 animrotation -90
0.3 PIE.@CASTSPELL|0X001|Apocalypse.esp|1|2.0|0|100|10|0|0|0|0
0.4 SpecialFrames_Invincible {\"Duration\": 0.5}
1.5 MCO_Recovery
";

// ── Canonical output ────────────────────────────────────────────────────

#[test]
fn sample_formats_canonically() {
    let out = format_document_with(
        SAMPLE,
        &FormatConfig {
            dispatch: Dispatch::Extended,
        },
    );
    let expected = "\
# numOriginalFrames: 38
# duration: 1.5
# numAnnotationTracks: 1

trackName: NPC Root [Root]
# numAnnotations: 6
0.100000 SoundPlay.WPNSwingUnarmed
0.200000 animmotion 0.000000 120.500000 0.000000
0.200000 animrotation -90.000000
0.300000 PIE.@CASTSPELL|0X001|Apocalypse.esp|1|2.0|0|100|10|0|0|0|0
0.400000 SpecialFrames_Invincible{\"Duration\": 0.5}
1.500000 MCO_Recovery
";
    assert_eq!(out, expected);
}

#[test]
fn lenient_document_formatting_treats_extended_lines_as_text() {
    let out = format_document("0.4 SpecialFrames_Invincible {\"Duration\": 0.5}");
    assert_eq!(out, "0.400000 SpecialFrames_Invincible {\"Duration\": 0.5}");
}

#[test]
fn numeric_precision() {
    assert_eq!(
        format_node(&parse_line("90 animrotation 90", 1)),
        "90.000000 animrotation 90.000000"
    );
    assert_eq!(
        format_node(&parse_line("0 animrotation -90.5", 1)),
        "0.000000 animrotation -90.500000"
    );
}

#[test]
fn mandatory_whitespace_collapses() {
    assert_eq!(
        format_node(&parse_line("1  \t animmotion    1\t\t2   3", 1)),
        "1.000000 animmotion 1.000000 2.000000 3.000000"
    );
}

#[test]
fn optional_whitespace_is_dropped() {
    assert_eq!(format_node(&parse_line("   # note   ", 1)), "# note");
    assert_eq!(
        format_node(&parse_line("\ttrackName:   Foot_L  ", 1)),
        "trackName: Foot_L"
    );
}

#[test]
fn blank_lines_format_to_empty() {
    assert_eq!(format_document("  \n\t\n"), "\n\n");
    // A text node with no time and no event would render as one separator.
    assert_eq!(format_node(&parse_line("", 1)), "");
}

#[test]
fn absent_fields_render_empty() {
    assert_eq!(
        format_node(&parse_line("1 animmotion 1", 1)),
        "1.000000 animmotion 1.000000  "
    );
}

#[test]
fn payload_instruction_keeps_empty_parameters() {
    assert_eq!(
        format_node(&parse_line_extended("0.3 PIE.@SGVB||", 1)),
        "0.300000 PIE.@SGVB||"
    );
}

#[test]
fn payload_instruction_without_prefix_is_not_lost() {
    assert_eq!(
        format_node(&parse_line_extended("  0.3 PIE.SGVB|a|1 ", 1)),
        "0.300000 PIE.SGVB|a|1"
    );
}

#[test]
fn invalid_iframe_payload_is_verbatim() {
    assert_eq!(
        format_node(&parse_line_extended("0.5 SpecialFrames_Invincible {invalid}", 1)),
        "0.500000 SpecialFrames_Invincible{invalid}"
    );
}

#[test]
fn crlf_line_endings_are_normalized() {
    assert_eq!(format_document("# a\r\n1 x\r\n"), "# a\n1.000000 x\n");
}

// ── Idempotence ─────────────────────────────────────────────────────────

#[test]
fn sample_is_stable() {
    assert_stable_both(SAMPLE);
}

#[test]
fn malformed_lines_are_stable() {
    for input in [
        "0.5animrotation90",
        "animmotion",
        "1 animmotion",
        "1 animmotion 1 2.x",
        "1 animmotion 1 2-",
        "1 animmotion 1 2 3e",
        "-animmotion 1",
        "+",
        ".5 hello",
        "1e",
        "5",
        "1.5.5",
        "1e999 animrotation -1e999",
        "1e400 text",
        "#",
        "#x",
        "trackname:",
        "trackname:x",
        "foo animmotion 1 2 3",
        "x SpecialFrames_Invincible{}",
        "0.5 SpecialFrames_Invincible",
        "{} specialframes_invincible",
        "3.PIE.@X",
        ".@X",
        "PIE.",
        "# PIE.@X",
        "0.3 PIE .@X| a |b ",
        "0.3 PIE.@|||",
        "0.3 pie.!",
        "ダッジ 0.5 animmotion",
    ] {
        assert_stable_both(input);
    }
}
