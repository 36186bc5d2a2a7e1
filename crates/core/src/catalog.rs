//! Catalog of native (`@`) payload instructions.
//!
//! Native instructions are implemented by the payload interpreter itself, so
//! their names and parameter lists are fixed. A profile may declare further
//! native instructions; those are untyped and only checked for arity.

use hkanno_profile::{CustomInstruction, Profile};
use serde::Serialize;

/// Expected shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Hex form ID, optionally `0x`-prefixed (`0x0001A2`, `0X001`).
    FormId,
    /// Plugin file name ending in `.esp`, `.esm`, or `.esl`.
    Plugin,
    /// `0`, `1`, `true`, or `false`.
    Bool,
    /// Signed integer.
    Int,
    /// Finite decimal number.
    Float,
    /// Anything.
    Text,
}

impl ParamKind {
    /// Short lowercase name for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::FormId => "form_id",
            ParamKind::Plugin => "plugin",
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Text => "text",
        }
    }

    /// Whether `value` (surrounding whitespace ignored) has this shape.
    pub fn accepts(self, value: &str) -> bool {
        let v = value.trim();
        match self {
            ParamKind::FormId => {
                let digits = v
                    .strip_prefix("0x")
                    .or_else(|| v.strip_prefix("0X"))
                    .unwrap_or(v);
                (1..=8).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_hexdigit())
            }
            ParamKind::Plugin => {
                let lower = v.to_ascii_lowercase();
                lower.len() > 4
                    && [".esp", ".esm", ".esl"]
                        .iter()
                        .any(|ext| lower.ends_with(ext))
            }
            ParamKind::Bool => {
                matches!(v, "0" | "1")
                    || v.eq_ignore_ascii_case("true")
                    || v.eq_ignore_ascii_case("false")
            }
            ParamKind::Int => v.parse::<i64>().is_ok(),
            ParamKind::Float => v.parse::<f64>().is_ok_and(f64::is_finite),
            ParamKind::Text => true,
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a native instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: &'static str,
    /// Expected value shape.
    pub kind: ParamKind,
}

/// A native instruction and its parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstructionSpec {
    /// Canonical (uppercase) name.
    pub name: &'static str,
    /// One-line description.
    pub summary: &'static str,
    /// Parameters in order.
    pub params: &'static [ParamSpec],
}

impl InstructionSpec {
    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

const fn p(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec { name, kind }
}

use ParamKind::{Bool, Float, FormId, Int, Plugin, Text};

/// Built-in native instructions.
pub static NATIVE_INSTRUCTIONS: &[InstructionSpec] = &[
    InstructionSpec {
        name: "SGVB",
        summary: "Set a boolean animation graph variable",
        params: &[p("graph_variable", Text), p("value", Bool)],
    },
    InstructionSpec {
        name: "SGVF",
        summary: "Set a float animation graph variable",
        params: &[p("graph_variable", Text), p("value", Float)],
    },
    InstructionSpec {
        name: "SGVI",
        summary: "Set an integer animation graph variable",
        params: &[p("graph_variable", Text), p("value", Int)],
    },
    InstructionSpec {
        name: "CASTSPELL",
        summary: "Cast a spell from the actor",
        params: &[
            p("spell", FormId),
            p("plugin", Plugin),
            p("effectiveness", Float),
            p("magnitude", Float),
            p("self_target", Bool),
            p("health_requirement", Float),
            p("health_cost", Float),
            p("stamina_requirement", Float),
            p("stamina_cost", Float),
            p("magicka_requirement", Float),
            p("magicka_cost", Float),
        ],
    },
    InstructionSpec {
        name: "APPLYSPELL",
        summary: "Apply a spell's effects to the actor",
        params: &[p("spell", FormId), p("plugin", Plugin)],
    },
    InstructionSpec {
        name: "UNAPPLYSPELL",
        summary: "Remove a spell's effects from the actor",
        params: &[p("spell", FormId), p("plugin", Plugin)],
    },
    InstructionSpec {
        name: "SETGHOST",
        summary: "Toggle the actor's ghost (invulnerable) state",
        params: &[p("ghost", Bool)],
    },
    InstructionSpec {
        name: "PLAYSOUND",
        summary: "Play a sound descriptor at the actor",
        params: &[p("sound", FormId), p("plugin", Plugin)],
    },
    InstructionSpec {
        name: "PLAYPARTICLE",
        summary: "Spawn a particle effect on a body part",
        params: &[
            p("nif_path", Text),
            p("body_part", Int),
            p("scale", Float),
            p("play_time", Float),
            p("flags", Int),
            p("x", Float),
            p("y", Float),
            p("z", Float),
        ],
    },
];

/// Find a built-in native instruction by name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<&'static InstructionSpec> {
    let name = name.trim();
    NATIVE_INSTRUCTIONS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// A native instruction resolved from the built-in catalog or a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInstruction<'a> {
    /// From [`NATIVE_INSTRUCTIONS`].
    Builtin(&'static InstructionSpec),
    /// Declared by the active profile.
    Profile(&'a CustomInstruction),
}

impl ResolvedInstruction<'_> {
    /// Canonical name.
    pub fn name(&self) -> &str {
        match self {
            ResolvedInstruction::Builtin(s) => s.name,
            ResolvedInstruction::Profile(c) => &c.name,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        match self {
            ResolvedInstruction::Builtin(s) => s.arity(),
            ResolvedInstruction::Profile(c) => c.parameters.len(),
        }
    }

    /// Name of the parameter at `index`.
    pub fn param_name(&self, index: usize) -> Option<&str> {
        match self {
            ResolvedInstruction::Builtin(s) => s.params.get(index).map(|p| p.name),
            ResolvedInstruction::Profile(c) => c.parameters.get(index).map(String::as_str),
        }
    }

    /// Expected shape of the parameter at `index`; profile parameters are untyped.
    pub fn param_kind(&self, index: usize) -> Option<ParamKind> {
        match self {
            ResolvedInstruction::Builtin(s) => s.params.get(index).map(|p| p.kind),
            ResolvedInstruction::Profile(_) => None,
        }
    }
}

/// Resolve a native instruction: built-ins first, then the profile's additions.
pub fn resolve<'a>(name: &str, profile: &'a Profile) -> Option<ResolvedInstruction<'a>> {
    lookup(name)
        .map(ResolvedInstruction::Builtin)
        .or_else(|| {
            profile
                .custom_instruction(name.trim())
                .map(ResolvedInstruction::Profile)
        })
}
