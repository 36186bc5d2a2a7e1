use super::{
    context::LineCtx,
    events::{check_head, check_unparsed, missing_event},
};
use crate::catalog::{self, ResolvedInstruction};
use crate::grammar::{
    ast::{Instruction, InstructionPrefix, PayloadInstructionLine},
    diag::{Diagnostic, codes},
    parser::PAYLOAD_HOST,
};

pub(super) fn check_payload_instruction(cx: &mut LineCtx, n: &PayloadInstructionLine) {
    check_head(
        cx,
        n.leading.as_ref(),
        &n.time,
        n.space_time_to_event.as_ref(),
        n.event.is_present(),
    );
    match n.event.as_str() {
        Some(host) if !cx.profile.accepts_host(host.trim()) => {
            let accepted = cx.profile.payload_hosts.join(", ");
            cx.push(
                Diagnostic::with_default_severity(
                    codes::PAYLOAD_UNKNOWN_HOST,
                    format!("unknown payload host `{}`", host.trim()),
                    n.event.span,
                )
                .with_context(ctx!("host" => host.trim(), "accepted" => accepted)),
            );
        }
        Some(_) => {}
        None => missing_event(cx, Some(PAYLOAD_HOST)),
    }
    cx.advance(n.event.span);
    cx.advance(n.dot.span);

    let Some(ins) = &n.instruction else {
        let span = n.unparsed.span.or(Some(cx.here()));
        let message = if n.dot.is_present() {
            "expected an instruction prefix (`@`, `$`, or `!`) after `.`"
        } else {
            "expected `.` followed by an instruction"
        };
        cx.push(Diagnostic::with_default_severity(
            codes::PAYLOAD_MISSING_INSTRUCTION,
            message,
            span,
        ));
        return;
    };
    check_instruction(cx, ins);
    check_unparsed(cx, &n.unparsed);
}

fn check_instruction(cx: &mut LineCtx, ins: &Instruction) {
    cx.advance(ins.prefix.span);
    let Some(name) = ins.name.as_str() else {
        cx.push(Diagnostic::with_default_severity(
            codes::PAYLOAD_MISSING_NAME,
            "instruction prefix is not followed by a name",
            Some(cx.here()),
        ));
        return;
    };
    let name = name.trim();

    if ins.prefix.value == Some(InstructionPrefix::Native) {
        match catalog::resolve(name, cx.profile) {
            Some(resolved) => check_native_parameters(cx, ins, &resolved),
            None => cx.push(
                Diagnostic::with_default_severity(
                    codes::PAYLOAD_UNKNOWN_INSTRUCTION,
                    format!("unknown native instruction `@{name}`"),
                    ins.name.span,
                )
                .with_context(ctx!("instruction" => name)),
            ),
        }
    }

    check_empty_parameters(cx, ins, name);
}

fn check_native_parameters(cx: &mut LineCtx, ins: &Instruction, resolved: &ResolvedInstruction) {
    let got = ins.parameter_count();
    let want = resolved.arity();
    if got < want {
        let missing: Vec<&str> = (got..want).filter_map(|i| resolved.param_name(i)).collect();
        cx.push(
            Diagnostic::with_default_severity(
                codes::PAYLOAD_TOO_FEW_PARAMETERS,
                format!(
                    "`@{}` takes {want} parameter(s), found {got}",
                    resolved.name()
                ),
                ins.name.span,
            )
            .with_context(ctx!(
                "instruction" => resolved.name(),
                "expected" => want.to_string(),
                "found" => got.to_string(),
                "missing" => missing.join(", "),
            )),
        );
    }

    for (i, item) in ins.parameters.iter().flat_map(|p| &p.items).enumerate() {
        let (Some(kind), Some(value)) = (resolved.param_kind(i), item.value.as_str()) else {
            continue;
        };
        if kind.accepts(value) {
            continue;
        }
        let param = resolved.param_name(i).unwrap_or("?");
        cx.push(
            Diagnostic::with_default_severity(
                codes::PAYLOAD_PARAMETER_TYPE,
                format!(
                    "parameter `{param}` of `@{}` should be a {kind}, found `{value}`",
                    resolved.name()
                ),
                item.value.span,
            )
            .with_context(ctx!(
                "instruction" => resolved.name(),
                "parameter" => param,
                "expected" => kind.as_str(),
                "value" => value,
            )),
        );
    }
}

fn check_empty_parameters(cx: &mut LineCtx, ins: &Instruction, name: &str) {
    let Some(severity) = cx.profile.empty_parameters else {
        return;
    };
    for (i, item) in ins.parameters.iter().flat_map(|p| &p.items).enumerate() {
        if item.value.is_present() {
            continue;
        }
        let span = item.separator.span;
        cx.push(
            Diagnostic::with_default_severity(
                codes::PAYLOAD_EMPTY_PARAMETER,
                format!("parameter {} of `{name}` is empty", i + 1),
                span,
            )
            .with_severity(severity)
            .with_context(ctx!("instruction" => name, "index" => (i + 1).to_string())),
        );
    }
}
