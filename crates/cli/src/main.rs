mod render;

use std::fs;
use std::io::{self, Read};
use std::process;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use hkanno_core::document::{NULL_STR, parse_document};
use hkanno_core::grammar::{
    dump::to_pretty_json,
    emit::{FormatConfig, format_document_with},
    parser::{Dispatch, parse_line_with},
};
use hkanno_core::validate::validate_document;
use hkanno_diagnostics::{self as diag, Diagnostic, Severity};
use hkanno_profile::Profile;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hkanno",
    version,
    about = "hkanno toolchain: parse, check, and format Havok animation annotations"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── File analysis ───────────────────────────────────────────────
    /// Parse every line of an annotation file and print the nodes as JSON.
    Parse {
        /// Input file, or `-` for stdin.
        file: String,
        /// Which line kinds the dispatcher may produce.
        #[arg(long, value_enum, default_value_t = DispatchArg::Lenient)]
        dispatch: DispatchArg,
    },

    /// Check an annotation file and report diagnostics.
    Check {
        /// Input file, or `-` for stdin.
        file: String,
        /// Lint profile JSON (iframe keys, payload hosts, extra instructions).
        #[arg(long)]
        profile: Option<String>,
    },

    /// Summarize the tracks of an hkanno v2 file.
    Tracks {
        /// Input file, or `-` for stdin.
        file: String,
        /// Print the canonical hkanno v2 text instead of a summary.
        #[arg(long)]
        canonical: bool,
    },

    // ── File transformation ─────────────────────────────────────────
    /// Format an annotation file (canonical numbers and whitespace).
    Format {
        /// Input file, or `-` for stdin.
        file: String,
        /// Write formatted output back to the file (in-place).
        #[arg(long, short, conflicts_with = "check")]
        write: bool,
        /// Check if the file is already formatted (exit 1 if not). For CI.
        #[arg(long, conflicts_with = "write")]
        check: bool,
        /// Which line kinds the dispatcher may produce.
        #[arg(long, value_enum, default_value_t = DispatchArg::Lenient)]
        dispatch: DispatchArg,
    },

    // ── Reference ───────────────────────────────────────────────────
    /// Explain a diagnostic ID (e.g. HKA2001).
    Explain { id: String },
}

/// Dispatcher choice for `parse` and `format`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DispatchArg {
    /// Comment, track name, motion, rotation, and text lines only.
    Lenient,
    /// Also invincibility frames and payload instructions.
    Extended,
}

impl From<DispatchArg> for Dispatch {
    fn from(d: DispatchArg) -> Self {
        match d {
            DispatchArg::Lenient => Dispatch::Lenient,
            DispatchArg::Extended => Dispatch::Extended,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    debug!(command:? = &cli.cmd; "Parsed arguments");

    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Parse { file, dispatch } => cmd_parse(&file, dispatch.into(), format)?,
        Cmd::Check { file, profile } => cmd_check(&file, profile.as_deref(), format)?,
        Cmd::Tracks { file, canonical } => cmd_tracks(&file, canonical, format)?,
        Cmd::Format {
            file,
            write,
            check,
            dispatch,
        } => cmd_format(&file, write, check, dispatch.into(), format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

fn init_logging(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(file: &str, dispatch: Dispatch, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let nodes: Vec<_> = source_lines(&input)
        .enumerate()
        .map(|(i, line)| parse_line_with(line, i + 1, dispatch))
        .collect();
    info!(file, lines = nodes.len(), dispatch:?; "Parsed file");

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "dispatch": dispatch,
                "nodes": nodes,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => println!("{}", to_pretty_json(&nodes)?),
    }
    Ok(())
}

fn cmd_check(file: &str, profile_path: Option<&str>, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let profile = profile_path.map(load_profile).transpose()?;
    let vr = validate_document(&input, profile.as_ref());

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": vr.ok,
                "issues": vr.issues,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, file, &vr.issues, format)?;
            print_summary(&vr.issues);
            if vr.ok {
                eprintln!("check ok");
            }
        }
    }

    exit_on_errors(&vr.issues);
    Ok(())
}

/// One track in the `tracks` summary.
#[derive(Serialize)]
struct TrackSummary<'a> {
    track_name: Option<&'a str>,
    annotations: usize,
}

fn cmd_tracks(file: &str, canonical: bool, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let result = parse_document(&input);
    let doc = &result.document;

    if format == Format::Pretty && !result.diagnostics.is_empty() {
        render_diagnostics(&input, file, &result.diagnostics, format)?;
        print_summary(&result.diagnostics);
    }

    if canonical {
        print!("{doc}");
        return Ok(());
    }

    match format {
        Format::Json => {
            let tracks: Vec<TrackSummary> = doc
                .annotation_tracks
                .iter()
                .map(|t| TrackSummary {
                    track_name: t.track_name.as_deref(),
                    annotations: t.annotations.len(),
                })
                .collect();
            let out = serde_json::json!({
                "num_original_frames": doc.num_original_frames,
                "duration": doc.duration,
                "annotations": doc.annotation_count(),
                "tracks": tracks,
                "diagnostics": result.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!(
                "{} frames, {}s, {} track(s), {} annotation(s)",
                doc.num_original_frames,
                doc.duration,
                doc.annotation_tracks.len(),
                doc.annotation_count()
            );
            for track in &doc.annotation_tracks {
                println!(
                    "  {}: {}",
                    track.track_name.as_deref().unwrap_or(NULL_STR),
                    track.annotations.len()
                );
            }
        }
    }
    Ok(())
}

fn cmd_format(
    file: &str,
    write: bool,
    check: bool,
    dispatch: Dispatch,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    let formatted = format_document_with(&input, &FormatConfig { dispatch });
    let already_formatted = formatted == input;
    debug!(file, already_formatted; "Formatted file");

    if check {
        status_message(
            format,
            already_formatted,
            "already formatted",
            "not formatted",
            file,
        )?;
        if !already_formatted {
            process::exit(1);
        }
    } else if write {
        if file == "-" {
            bail!("--write needs a file path, not stdin");
        }
        if !already_formatted {
            fs::write(file, &formatted).with_context(|| format!("failed to write {file}"))?;
        }
        status_message(
            format,
            !already_formatted,
            "formatted",
            "already formatted",
            file,
        )?;
    } else {
        print!("{formatted}");
    }

    Ok(())
}

/// Emit a status message for --check / --write in the appropriate format.
fn status_message(
    format: Format,
    condition: bool,
    if_true: &str,
    if_false: &str,
    file: &str,
) -> Result<()> {
    let msg = if condition { if_true } else { if_false };
    match format {
        Format::Json => {
            let out = serde_json::json!({ "status": msg, "file": file });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => eprintln!("{msg}: {file}"),
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    let id = id.trim().to_ascii_uppercase();
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "summary": diag::summary(&id),
                "severity": diag::default_severity(&id),
                "explanation": diag::explain(&id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation goes to stdout, not stderr.
            use ariadne::Fmt;
            match (diag::summary(&id), diag::explain(&id)) {
                (Some(summary), Some(text)) => {
                    println!("{}: {summary}", id.as_str().fg(ariadne::Color::Cyan));
                    println!();
                    println!("{text}");
                }
                _ => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a file, or stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
    }
}

/// Lines of `input`, without the empty line after a final newline.
fn source_lines(input: &str) -> std::str::Split<'_, char> {
    input.strip_suffix('\n').unwrap_or(input).split('\n')
}

fn load_profile(path: &str) -> Result<Profile> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read profile {path}"))?;
    let profile = hkanno_profile::load_profile_from_str(&text)
        .with_context(|| format!("invalid profile {path}"))?;
    info!(path, id = profile.id.as_str(); "Loaded profile");
    Ok(profile)
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
