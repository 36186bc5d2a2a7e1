use super::context::LineCtx;
use crate::grammar::{
    ast::{Field, MotionLine, RotationLine, TextLine, TrackNameLine, Whitespace},
    diag::{Diagnostic, codes},
    parser::{MOTION_EVENT, ROTATION_EVENT},
};

/// Check `<leading><time><ws>` and leave the cursor before the event.
pub(super) fn check_head(
    cx: &mut LineCtx,
    leading: Option<&Whitespace>,
    time: &Field<f64>,
    space: Option<&Whitespace>,
    event_present: bool,
) {
    cx.advance(leading.map(|w| w.span));
    if time.is_present() {
        check_number(cx, time, "time");
    } else {
        cx.push(Diagnostic::with_default_severity(
            codes::PARSER_MISSING_TIME,
            "annotation line has no time",
            Some(cx.here()),
        ));
    }
    check_separator(cx, space, time.is_present(), event_present, "time", "event");
}

/// Report a missing event keyword at the cursor.
pub(super) fn missing_event(cx: &mut LineCtx, expected: Option<&str>) {
    let message = match expected {
        Some(keyword) => format!("expected `{keyword}` after the time"),
        None => "annotation line has no event after the time".to_string(),
    };
    let mut diag = Diagnostic::with_default_severity(
        codes::PARSER_MISSING_EVENT,
        message,
        Some(cx.here()),
    );
    if let Some(keyword) = expected {
        diag = diag.with_context(ctx!("expected" => keyword));
    }
    cx.push(diag);
}

/// Report a present-but-infinite number and move past it.
pub(super) fn check_number(cx: &mut LineCtx, field: &Field<f64>, name: &str) {
    if let Some(v) = field.value
        && !v.is_finite()
    {
        cx.push(
            Diagnostic::with_default_severity(
                codes::PARSER_NON_FINITE_NUMBER,
                format!("{name} does not fit in a 64-bit float"),
                field.span,
            )
            .with_context(ctx!("field" => name)),
        );
    }
    cx.advance(field.span);
}

/// Report a missing mandatory separator between two present tokens.
pub(super) fn check_separator(
    cx: &mut LineCtx,
    space: Option<&Whitespace>,
    before_present: bool,
    after_present: bool,
    before: &str,
    after: &str,
) {
    match space {
        Some(ws) => cx.advance(Some(ws.span)),
        None if before_present && after_present => cx.push(
            Diagnostic::with_default_severity(
                codes::PARSER_MISSING_SEPARATOR,
                format!("missing whitespace between {before} and {after}"),
                Some(cx.here()),
            )
            .with_context(ctx!("before" => before, "after" => after)),
        ),
        None => {}
    }
}

/// Check a required numeric argument of `event`.
fn check_argument(cx: &mut LineCtx, event: &str, field: &Field<f64>, name: &str) {
    if field.is_present() {
        check_number(cx, field, name);
    } else {
        cx.push(
            Diagnostic::with_default_severity(
                codes::PARSER_MISSING_ARGUMENT,
                format!("`{event}` is missing its `{name}` argument"),
                Some(cx.here()),
            )
            .with_context(ctx!("event" => event, "argument" => name)),
        );
    }
}

pub(super) fn check_unparsed(cx: &mut LineCtx, unparsed: &Field<String>) {
    if let Some(text) = unparsed.as_str() {
        cx.push(
            Diagnostic::with_default_severity(
                codes::PARSER_TRAILING_TEXT,
                format!("unexpected text `{}`", text.trim_end()),
                unparsed.span,
            )
            .with_context(ctx!("text" => text.trim_end())),
        );
    }
}

pub(super) fn check_text(cx: &mut LineCtx, n: &TextLine) {
    check_head(
        cx,
        n.leading.as_ref(),
        &n.time,
        n.space_time_to_event.as_ref(),
        n.event.is_present(),
    );
    if n.time.is_present() && !n.event.is_present() {
        missing_event(cx, None);
    }
}

pub(super) fn check_track_name(cx: &mut LineCtx, n: &TrackNameLine) {
    if n.name.is_present() {
        return;
    }
    cx.advance(n.leading.as_ref().map(|w| w.span));
    cx.advance(n.keyword.span);
    cx.advance(n.space.as_ref().map(|w| w.span));
    cx.push(Diagnostic::with_default_severity(
        codes::PARSER_MISSING_TRACK_NAME,
        "track name declaration has no name",
        Some(cx.here()),
    ));
}

pub(super) fn check_motion(cx: &mut LineCtx, n: &MotionLine) {
    check_head(
        cx,
        n.leading.as_ref(),
        &n.time,
        n.space_time_to_event.as_ref(),
        n.event.is_present(),
    );
    if n.event.is_present() {
        cx.advance(n.event.span);
        let space_x = n.space_event_to_x.as_ref();
        check_separator(cx, space_x, true, n.x.is_present(), MOTION_EVENT, "x");
        check_argument(cx, MOTION_EVENT, &n.x, "x");
        let space_y = n.space_x_to_y.as_ref();
        check_separator(cx, space_y, n.x.is_present(), n.y.is_present(), "x", "y");
        check_argument(cx, MOTION_EVENT, &n.y, "y");
        let space_z = n.space_y_to_z.as_ref();
        check_separator(cx, space_z, n.y.is_present(), n.z.is_present(), "y", "z");
        check_argument(cx, MOTION_EVENT, &n.z, "z");
    } else {
        missing_event(cx, Some(MOTION_EVENT));
    }
    check_unparsed(cx, &n.unparsed);
}

pub(super) fn check_rotation(cx: &mut LineCtx, n: &RotationLine) {
    check_head(
        cx,
        n.leading.as_ref(),
        &n.time,
        n.space_time_to_event.as_ref(),
        n.event.is_present(),
    );
    if n.event.is_present() {
        cx.advance(n.event.span);
        let space = n.space_event_to_degrees.as_ref();
        check_separator(cx, space, true, n.degrees.is_present(), ROTATION_EVENT, "degrees");
        check_argument(cx, ROTATION_EVENT, &n.degrees, "degrees");
    } else {
        missing_event(cx, Some(ROTATION_EVENT));
    }
    check_unparsed(cx, &n.unparsed);
}
