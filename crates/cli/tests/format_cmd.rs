//! CLI tests for the `hkanno format` subcommand.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use assert_cmd::cargo;

fn hkanno_cmd() -> Command {
    Command::new(cargo::cargo_bin!("hkanno"))
}

fn write_temp_anno(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("anno.txt");
    fs::write(&path, content).expect("write temp annotations");
    (dir, path.to_string_lossy().to_string())
}

const UNFORMATTED: &str = "  0.1   MCO_DodgeOpen\n0.2 animmotion 0 120.5 0\n#note\n";
const FORMATTED: &str = "0.100000 MCO_DodgeOpen\n0.200000 animmotion 0.000000 120.500000 0.000000\n# note\n";

#[test]
fn format_help_shows_dispatch_flag() {
    let output = hkanno_cmd()
        .args(["format", "--help"])
        .output()
        .expect("run format help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--dispatch"), "missing --dispatch: {stdout}");
    assert!(stdout.contains("--check"), "missing --check: {stdout}");
}

#[test]
fn format_prints_canonical_text_to_stdout() {
    let (_dir, path) = write_temp_anno(UNFORMATTED);
    let output = hkanno_cmd()
        .args(["format", &path])
        .output()
        .expect("run format");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), FORMATTED);
}

#[test]
fn format_check_json_reports_not_formatted() {
    let (_dir, path) = write_temp_anno(UNFORMATTED);
    let output = hkanno_cmd()
        .args(["format", &path, "--check", "--output", "json"])
        .output()
        .expect("run format --check");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid status json");
    assert_eq!(json["status"], "not formatted");
    assert_eq!(json["file"], path);
}

#[test]
fn format_check_passes_on_formatted_file() {
    let (_dir, path) = write_temp_anno(FORMATTED);
    let output = hkanno_cmd()
        .args(["format", &path, "--check", "--output", "json"])
        .output()
        .expect("run format --check");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid status json");
    assert_eq!(json["status"], "already formatted");
}

#[test]
fn format_write_rewrites_file() {
    let (_dir, path) = write_temp_anno(UNFORMATTED);
    let output = hkanno_cmd()
        .args(["format", &path, "--write", "--output", "json"])
        .output()
        .expect("run format --write");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid status json");
    assert_eq!(json["status"], "formatted");
    assert_eq!(fs::read_to_string(&path).unwrap(), FORMATTED);
}

#[test]
fn format_write_and_check_conflict() {
    let (_dir, path) = write_temp_anno(FORMATTED);
    let output = hkanno_cmd()
        .args(["format", &path, "--write", "--check"])
        .output()
        .expect("run format");
    assert!(!output.status.success());
}

#[test]
fn format_dispatch_extended_strips_iframe_spacing() {
    let (_dir, path) = write_temp_anno("0.4 SpecialFrames_Invincible {\"Duration\": 0.5}\n");

    let lenient = hkanno_cmd()
        .args(["format", &path])
        .output()
        .expect("run format");
    assert_eq!(
        String::from_utf8_lossy(&lenient.stdout),
        "0.400000 SpecialFrames_Invincible {\"Duration\": 0.5}\n"
    );

    let extended = hkanno_cmd()
        .args(["format", &path, "--dispatch", "extended"])
        .output()
        .expect("run format --dispatch extended");
    assert_eq!(
        String::from_utf8_lossy(&extended.stdout),
        "0.400000 SpecialFrames_Invincible{\"Duration\": 0.5}\n"
    );
}

#[test]
fn format_reads_stdin() {
    let mut child = hkanno_cmd()
        .args(["format", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn format");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(UNFORMATTED.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("wait for format");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), FORMATTED);
}

#[test]
fn format_missing_file_fails() {
    let output = hkanno_cmd()
        .args(["format", "/definitely/not/here.txt"])
        .output()
        .expect("run format");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
