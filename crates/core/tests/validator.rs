//! Validator tests.
//!
//! Line checks (HKA1xxx), iframe payload checks (HKA2xxx), payload
//! instruction checks (HKA3xxx), and document structure (HKA4xxx).
//!
//! Parser tests (dispatch, field layout, spans) live in `parser.rs`.

mod common;

use common::{find_diag, has_diag, ids, profile_from_json};
use hkanno_core::grammar::parser::parse_line_extended;
use hkanno_core::validate::{validate_document, validate_line};
use hkanno_diagnostics::{Diagnostic, Severity, Span, codes};
use hkanno_profile::Profile;

fn check(line: &str) -> Vec<Diagnostic> {
    check_with(line, &Profile::default())
}

fn check_with(line: &str, profile: &Profile) -> Vec<Diagnostic> {
    validate_line(&parse_line_extended(line, 1), 1, profile)
}

// ─── Clean lines ─────────────────────────────────────────────────────────────

#[test]
fn well_formed_lines_have_no_issues() {
    for line in [
        "# comment",
        "trackName: Root",
        "0.100000 MCO_DodgeOpen",
        "0.2 animmotion 0 120.5 0",
        "0.2 animrotation -90",
        r#"0.4 SpecialFrames_Invincible{"Duration":0.5}"#,
        "0.3 PIE.@CASTSPELL|0X001|Apocalypse.esp|1|2.0|0|100|10|0|0|0|0",
        "0.3 PIE.$Anything|x",
        "0.3 PIE.!Later",
        "",
        "   ",
    ] {
        let issues = check(line);
        assert!(issues.is_empty(), "{line:?} produced {:?}", ids(&issues));
    }
}

// ─── Line structure ──────────────────────────────────────────────────────────

#[test]
fn missing_time() {
    let issues = check("hello");
    let d = find_diag(&issues, codes::PARSER_MISSING_TIME);
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.span, Some(Span::empty(1, 1)));
}

#[test]
fn missing_time_after_leading_whitespace() {
    let issues = check("   animrotation 5");
    let d = find_diag(&issues, codes::PARSER_MISSING_TIME);
    assert_eq!(d.span, Some(Span::empty(1, 4)));
}

#[test]
fn missing_separators_are_reported_at_the_gap() {
    let issues = check("0.5animrotation90");
    let seps: Vec<_> = issues
        .iter()
        .filter(|d| d.id == codes::PARSER_MISSING_SEPARATOR)
        .collect();
    assert_eq!(seps.len(), 2, "{:?}", ids(&issues));
    assert_eq!(seps[0].span, Some(Span::empty(1, 4)));
    assert_eq!(seps[1].span, Some(Span::empty(1, 16)));
    assert_eq!(
        seps[1].context.as_ref().unwrap()["after"],
        "degrees"
    );
}

#[test]
fn missing_event_on_text_line() {
    let issues = check("0.5");
    assert!(has_diag(&issues, codes::PARSER_MISSING_EVENT));
}

#[test]
fn misplaced_motion_keyword() {
    let issues = check("0.5 start animmotion 1 2 3");
    let d = find_diag(&issues, codes::PARSER_MISSING_EVENT);
    assert_eq!(d.context.as_ref().unwrap()["expected"], "animmotion");
    assert!(has_diag(&issues, codes::PARSER_TRAILING_TEXT));
    assert!(!has_diag(&issues, codes::PARSER_MISSING_ARGUMENT));
}

#[test]
fn missing_motion_arguments() {
    let issues = check("1 animmotion 5");
    let args: Vec<_> = issues
        .iter()
        .filter(|d| d.id == codes::PARSER_MISSING_ARGUMENT)
        .map(|d| d.context.as_ref().unwrap()["argument"].clone())
        .collect();
    assert_eq!(args, ["y", "z"]);
}

#[test]
fn missing_rotation_degrees() {
    let issues = check("1 animrotation");
    let d = find_diag(&issues, codes::PARSER_MISSING_ARGUMENT);
    assert_eq!(d.span, Some(Span::empty(1, 15)));
}

#[test]
fn non_finite_number() {
    let issues = check("0.5 animrotation 1e999");
    let d = find_diag(&issues, codes::PARSER_NON_FINITE_NUMBER);
    assert_eq!(d.span, Some(Span::new(1, 18, 23)));
    assert_eq!(d.context.as_ref().unwrap()["field"], "degrees");
}

#[test]
fn trailing_text_is_a_warning() {
    let issues = check("1 animrotation 90 degrees");
    let d = find_diag(&issues, codes::PARSER_TRAILING_TEXT);
    assert_eq!(d.severity, Severity::Warn);
    assert_eq!(d.span, Some(Span::new(1, 19, 26)));
}

#[test]
fn track_name_without_name() {
    let issues = check("trackName:");
    let d = find_diag(&issues, codes::PARSER_MISSING_TRACK_NAME);
    assert_eq!(d.severity, Severity::Warn);
    assert_eq!(d.span, Some(Span::empty(1, 11)));
}

// ─── Iframe payload ──────────────────────────────────────────────────────────

#[test]
fn iframe_invalid_json() {
    let issues = check("0.5 SpecialFrames_Invincible{invalid}");
    let d = find_diag(&issues, codes::IFRAME_INVALID_JSON);
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.span, Some(Span::new(1, 29, 38)));
    let ctx = d.context.as_ref().unwrap();
    assert!(!ctx["error"].is_empty());
    assert_eq!(ctx["payload"], "{invalid}");
}

#[test]
fn iframe_missing_payload() {
    let issues = check("0.5 SpecialFrames_Invincible");
    assert_eq!(ids(&issues), [codes::IFRAME_MISSING_PAYLOAD]);
}

#[test]
fn iframe_payload_not_object() {
    let issues = check("0.5 SpecialFrames_Invincible [0.5]");
    let d = find_diag(&issues, codes::IFRAME_NOT_OBJECT);
    assert_eq!(d.context.as_ref().unwrap()["found"], "an array");
}

#[test]
fn iframe_unexpected_keys_follow_profile() {
    let line = r#"0.5 SpecialFrames_Invincible{"Duration":1,"Source":"x"}"#;
    let issues = check(line);
    let d = find_diag(&issues, codes::IFRAME_UNEXPECTED_KEY);
    assert_eq!(d.context.as_ref().unwrap()["key"], "Source");

    let profile = profile_from_json(
        r#"{"id":"t","schema_version":"1.0.0","iframe_keys":["Duration","Source"]}"#,
    );
    assert!(check_with(line, &profile).is_empty());
}

#[test]
fn iframe_keyword_not_at_event_position() {
    let issues = check("0.5 x SpecialFrames_Invincible{}");
    let d = find_diag(&issues, codes::PARSER_MISSING_EVENT);
    assert_eq!(
        d.context.as_ref().unwrap()["expected"],
        "SpecialFrames_Invincible"
    );
}

// ─── Payload instructions ────────────────────────────────────────────────────

#[test]
fn unknown_host() {
    assert!(check("0.3 pie.@SGVB|a|1").is_empty());
    let issues = check("0.3 NOTPIE.@SGVB|a|1");
    let d = find_diag(&issues, codes::PAYLOAD_UNKNOWN_HOST);
    assert_eq!(d.context.as_ref().unwrap()["host"], "NOTPIE");
}

#[test]
fn host_list_comes_from_profile() {
    let profile = profile_from_json(
        r#"{"id":"t","schema_version":"1.0.0","payload_hosts":["PIE","NOTPIE"]}"#,
    );
    assert!(check_with("0.3 NOTPIE.@SGVB|a|1", &profile).is_empty());
}

#[test]
fn missing_instruction_prefix() {
    let issues = check("0.3 PIE.CASTSPELL|a");
    let d = find_diag(&issues, codes::PAYLOAD_MISSING_INSTRUCTION);
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.span, Some(Span::new(1, 9, 20)));
}

#[test]
fn missing_instruction_after_dot() {
    let issues = check("0.3 PIE.");
    let d = find_diag(&issues, codes::PAYLOAD_MISSING_INSTRUCTION);
    assert_eq!(d.span, Some(Span::empty(1, 9)));
}

#[test]
fn missing_instruction_name() {
    let issues = check("0.3 PIE.@|1");
    let d = find_diag(&issues, codes::PAYLOAD_MISSING_NAME);
    assert_eq!(d.span, Some(Span::empty(1, 10)));
}

#[test]
fn unknown_native_instruction() {
    let issues = check("0.3 PIE.@FLY|1");
    let d = find_diag(&issues, codes::PAYLOAD_UNKNOWN_INSTRUCTION);
    assert_eq!(d.span, Some(Span::new(1, 10, 13)));
    assert_eq!(d.context.as_ref().unwrap()["instruction"], "FLY");
}

#[test]
fn native_lookup_ignores_case() {
    assert!(check("0.3 PIE.@sgvb|a|1").is_empty());
}

#[test]
fn custom_and_async_instructions_are_unconstrained() {
    assert!(check("0.3 PIE.$FLY").is_empty());
    assert!(check("0.3 PIE.!FLY|1|2|3").is_empty());
}

#[test]
fn too_few_parameters() {
    let issues = check("0.3 PIE.@CASTSPELL|0X001|Apocalypse.esp");
    let d = find_diag(&issues, codes::PAYLOAD_TOO_FEW_PARAMETERS);
    let ctx = d.context.as_ref().unwrap();
    assert_eq!(ctx["expected"], "11");
    assert_eq!(ctx["found"], "2");
    assert!(ctx["missing"].starts_with("effectiveness, magnitude"));
}

#[test]
fn empty_parameters_count_toward_arity() {
    let issues = check("0.3 PIE.@SGVB||");
    assert!(!has_diag(&issues, codes::PAYLOAD_TOO_FEW_PARAMETERS));
    let empties: Vec<_> = issues
        .iter()
        .filter(|d| d.id == codes::PAYLOAD_EMPTY_PARAMETER)
        .collect();
    assert_eq!(empties.len(), 2);
    assert_eq!(empties[0].span, Some(Span::new(1, 14, 15)));
    assert_eq!(empties[0].severity, Severity::Warn);
}

#[test]
fn empty_parameter_severity_follows_profile() {
    let strict = profile_from_json(
        r#"{"id":"t","schema_version":"1.0.0","empty_parameters":"error"}"#,
    );
    let issues = check_with("0.3 PIE.$X||", &strict);
    assert!(issues.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(issues.len(), 2);

    let off = profile_from_json(r#"{"id":"t","schema_version":"1.0.0","empty_parameters":null}"#);
    assert!(check_with("0.3 PIE.$X||", &off).is_empty());
}

#[test]
fn parameter_type_mismatch() {
    let issues = check("0.3 PIE.@SGVB|Flag|maybe");
    let d = find_diag(&issues, codes::PAYLOAD_PARAMETER_TYPE);
    let ctx = d.context.as_ref().unwrap();
    assert_eq!(ctx["parameter"], "value");
    assert_eq!(ctx["expected"], "bool");
    assert_eq!(d.span, Some(Span::new(1, 20, 25)));
}

#[test]
fn profile_instructions_extend_the_catalog() {
    let profile = profile_from_json(
        r#"{"id":"t","schema_version":"1.0.0",
            "custom_instructions":[{"name":"SETSCALE","parameters":["actor","scale"]}]}"#,
    );
    assert!(check_with("0.3 PIE.@SETSCALE|player|anything", &profile).is_empty());
    let issues = check_with("0.3 PIE.@SETSCALE|player", &profile);
    assert!(has_diag(&issues, codes::PAYLOAD_TOO_FEW_PARAMETERS));
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[test]
fn document_result_ok_ignores_warnings() {
    let vr = validate_document("trackName: T\n1 animrotation 90 extra\n", None);
    assert!(vr.ok);
    assert_eq!(ids(&vr.issues), [codes::PARSER_TRAILING_TEXT]);
}

#[test]
fn document_result_not_ok_on_errors() {
    let vr = validate_document("trackName: T\n0.5 SpecialFrames_Invincible{bad}\n", None);
    assert!(!vr.ok);
    assert_eq!(vr.issues[0].span.unwrap().line, 2);
}

#[test]
fn annotation_before_first_track() {
    let vr = validate_document("# header\n0.1 early\ntrackName: T\n0.2 late\n", None);
    let d = find_diag(&vr.issues, codes::DOCUMENT_ANNOTATION_BEFORE_TRACK);
    assert_eq!(d.span, Some(Span::new(2, 1, 4)));
    assert_eq!(vr.issues.len(), 1);
}

#[test]
fn snippets_without_tracks_are_allowed() {
    let vr = validate_document("0.1 a\n0.2 b\n", None);
    assert!(vr.ok);
    assert!(vr.issues.is_empty());
}

#[test]
fn document_uses_given_profile() {
    let profile = profile_from_json(r#"{"id":"t","schema_version":"1.0.0","iframe_keys":["X"]}"#);
    let text = "trackName: T\n0.5 SpecialFrames_Invincible{\"Duration\":1}";
    assert!(has_diag(
        &validate_document(text, Some(&profile)).issues,
        codes::IFRAME_UNEXPECTED_KEY
    ));
    assert!(validate_document(text, None).issues.is_empty());
}

#[test]
fn diagnostics_explain_themselves() {
    let issues = check("hello");
    assert!(issues[0].explain().is_some());
}
