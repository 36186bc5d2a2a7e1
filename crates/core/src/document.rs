//! Whole-file hkanno v2 documents.
//!
//! ```text
//! # numOriginalFrames: 38
//! # duration: 1.5
//! # numAnnotationTracks: 1
//!
//! trackName: PairedRoot
//! # numAnnotations: 2
//! 0.100000 MCO_DodgeOpen
//! 0.400000 MCO_DodgeClose
//! ```
//!
//! Each line is parsed on its own with the lenient dispatcher; the document
//! model then groups annotations under the most recent `trackName:` line.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::{
    ast::Node,
    diag::{Diagnostic, Span, codes},
    parser::parse_line,
};

/// Placeholder written for a missing track name or annotation text.
pub const NULL_STR: &str = "\u{2400}";

const HEADER_NUM_ORIGINAL_FRAMES: &str = "numOriginalFrames";
const HEADER_DURATION: &str = "duration";

/// Annotation data of one animation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hkanno {
    /// Number of frames in the original animation.
    pub num_original_frames: i32,
    /// Total duration in seconds.
    pub duration: f32,
    /// Annotation tracks in source order.
    pub annotation_tracks: Vec<AnnotationTrack>,
}

/// A named list of timed annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationTrack {
    /// Track (bone) name; `None` is written as `␀`.
    pub track_name: Option<String>,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
}

/// One timed annotation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    /// Time in seconds.
    pub time: f32,
    /// Annotation text; `None` is written as `␀`.
    pub text: Option<String>,
}

impl Hkanno {
    /// Total number of annotations across all tracks.
    pub fn annotation_count(&self) -> usize {
        self.annotation_tracks
            .iter()
            .map(|t| t.annotations.len())
            .sum()
    }
}

impl fmt::Display for Hkanno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {HEADER_NUM_ORIGINAL_FRAMES}: {}", self.num_original_frames)?;
        writeln!(f, "# {HEADER_DURATION}: {}", self.duration)?;
        writeln!(f, "# numAnnotationTracks: {}", self.annotation_tracks.len())?;
        writeln!(f)?;

        for track in &self.annotation_tracks {
            writeln!(
                f,
                "trackName: {}",
                track.track_name.as_deref().unwrap_or(NULL_STR)
            )?;
            writeln!(f, "# numAnnotations: {}", track.annotations.len())?;
            for ann in &track.annotations {
                let text = ann.text.as_deref().unwrap_or(NULL_STR);
                writeln!(f, "{:.6} {}", ann.time, text)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Result of building a document from text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// The document built from every line that could be placed.
    pub document: Hkanno,
    /// Problems that kept lines out of the document or lost data.
    pub diagnostics: Vec<Diagnostic>,
}

/// Build an [`Hkanno`] document from hkanno v2 text.
///
/// Total: malformed lines are skipped and reported in
/// [`DocumentResult::diagnostics`].
pub fn parse_document(text: &str) -> DocumentResult {
    let mut document = Hkanno::default();
    let mut diagnostics = Vec::new();

    for (i, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = i + 1;
        let node = parse_line(line, line_number);
        match &node {
            Node::Comment(c) => {
                if let Some(comment) = c.comment.as_str() {
                    read_header(&mut document, comment);
                }
            }
            Node::TrackName(t) => {
                let name = t.name.as_str().filter(|n| *n != NULL_STR);
                if !t.name.is_present() {
                    diagnostics.push(Diagnostic::with_default_severity(
                        codes::PARSER_MISSING_TRACK_NAME,
                        format!("track name declaration has no name; using `{NULL_STR}`"),
                        t.keyword.span,
                    ));
                }
                document.annotation_tracks.push(AnnotationTrack {
                    track_name: name.map(str::to_owned),
                    annotations: Vec::new(),
                });
            }
            _ => {
                if let Some(ann) = read_annotation(line, line_number, &node, &mut diagnostics) {
                    match document.annotation_tracks.last_mut() {
                        Some(track) => track.annotations.push(ann),
                        None => diagnostics.push(
                            Diagnostic::with_default_severity(
                                codes::DOCUMENT_ANNOTATION_BEFORE_TRACK,
                                "annotation appears before the first `trackName:` declaration; dropped",
                                node.time().and_then(|t| t.span),
                            )
                            .with_context(std::collections::BTreeMap::from([(
                                "kind".to_string(),
                                node.kind().as_str().to_string(),
                            )])),
                        ),
                    }
                }
            }
        }
    }

    log::debug!(
        tracks = document.annotation_tracks.len(),
        annotations = document.annotation_count(),
        diagnostics = diagnostics.len();
        "Built hkanno document"
    );
    DocumentResult {
        document,
        diagnostics,
    }
}

fn read_header(document: &mut Hkanno, comment: &str) {
    let Some((key, value)) = comment.split_once(':') else {
        return;
    };
    let (key, value) = (key.trim(), value.trim());
    if key.eq_ignore_ascii_case(HEADER_NUM_ORIGINAL_FRAMES) {
        if let Ok(n) = value.parse() {
            document.num_original_frames = n;
        }
    } else if key.eq_ignore_ascii_case(HEADER_DURATION)
        && let Ok(d) = value.parse()
    {
        document.duration = d;
    }
}

fn read_annotation(
    line: &str,
    line_number: usize,
    node: &Node,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Annotation> {
    let time = node.time()?;
    let Some(value) = time.value else {
        diagnostics.push(Diagnostic::with_default_severity(
            codes::PARSER_MISSING_TIME,
            "annotation line has no time; dropped",
            Some(Span::empty(line_number, 1)),
        ));
        return None;
    };
    let seconds = value as f32;
    if !seconds.is_finite() {
        diagnostics.push(Diagnostic::with_default_severity(
            codes::PARSER_NON_FINITE_NUMBER,
            "annotation time does not fit in a 32-bit float; dropped",
            time.span,
        ));
        return None;
    }

    let text_start = node
        .space_time_to_event()
        .map(|ws| ws.span.end_column)
        .or(time.span.map(|s| s.end_column))
        .unwrap_or(1);
    let rest: String = line.chars().skip(text_start - 1).collect();
    let rest = rest.trim_end();
    let text = if rest.is_empty() {
        diagnostics.push(Diagnostic::with_default_severity(
            codes::PARSER_MISSING_EVENT,
            format!("annotation line has no text; using `{NULL_STR}`"),
            Some(Span::empty(line_number, text_start)),
        ));
        None
    } else if rest == NULL_STR {
        None
    } else {
        Some(rest.to_owned())
    };

    Some(Annotation {
        time: seconds,
        text,
    })
}
