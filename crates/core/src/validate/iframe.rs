use super::{
    context::LineCtx,
    events::{check_head, missing_event},
};
use crate::grammar::{
    ast::IframeLine,
    diag::{Diagnostic, codes},
    parser::IFRAME_EVENT,
};

pub(super) fn check_iframe(cx: &mut LineCtx, n: &IframeLine) {
    check_head(
        cx,
        n.leading.as_ref(),
        &n.time,
        n.space_time_to_event.as_ref(),
        n.event.is_present(),
    );
    if !n.event.is_present() {
        missing_event(cx, Some(IFRAME_EVENT));
        return;
    }
    cx.advance(n.event.span);
    cx.advance(n.space_event_to_payload.as_ref().map(|w| w.span));

    let Some(raw) = n.raw_payload.as_str() else {
        cx.push(Diagnostic::with_default_severity(
            codes::IFRAME_MISSING_PAYLOAD,
            format!("`{IFRAME_EVENT}` has no JSON payload"),
            Some(cx.here()),
        ));
        return;
    };

    if let Some(err) = &n.parse_error {
        cx.push(
            Diagnostic::with_default_severity(
                codes::IFRAME_INVALID_JSON,
                format!("invalid JSON payload: {err}"),
                n.raw_payload.span,
            )
            .with_context(ctx!("error" => err.as_str(), "payload" => raw)),
        );
        return;
    }

    let Some(value) = n.payload.value() else {
        return;
    };
    let Some(object) = value.as_object() else {
        cx.push(
            Diagnostic::with_default_severity(
                codes::IFRAME_NOT_OBJECT,
                format!("payload is {}, expected an object", json_type_name(value)),
                n.raw_payload.span,
            )
            .with_context(ctx!("found" => json_type_name(value))),
        );
        return;
    };

    let allowed = cx.profile.iframe_keys.join(", ");
    for key in object.keys() {
        if !cx.profile.allows_iframe_key(key) {
            cx.push(
                Diagnostic::with_default_severity(
                    codes::IFRAME_UNEXPECTED_KEY,
                    format!("unexpected payload key `{key}`"),
                    n.raw_payload.span,
                )
                .with_context(ctx!("key" => key.as_str(), "allowed" => allowed.as_str())),
            );
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
