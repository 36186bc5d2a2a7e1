use hkanno_diagnostics::Span;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeral written for a value too large for `f64`.
pub(crate) const POSITIVE_OVERFLOW: &str = "1e999";
/// Numeral written for a value too small for `f64`.
pub(crate) const NEGATIVE_OVERFLOW: &str = "-1e999";

/// An optional typed value together with the source range it was read from.
///
/// A field without a value is not an error: it records that the token was
/// not present at the expected cursor position (e.g. a line still being
/// typed). A field can also carry a span without a value when the raw text
/// was present but could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: FieldValue", deserialize = "T: FieldValue"))]
pub struct Field<T> {
    /// Decoded value, if any.
    #[serde(
        default = "Option::default",
        skip_serializing_if = "Option::is_none",
        with = "field_value"
    )]
    pub value: Option<T>,
    /// Where the raw text of this field was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// A type that can be the value of a [`Field`].
///
/// Values serialize as themselves, except non-finite numbers: JSON has no
/// infinity, so they are written as the numerals the formatter emits
/// (`"1e999"`, `"-1e999"`) and decode back to the same value.
pub trait FieldValue: Sized {
    /// Serialize the value.
    fn serialize_value<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
    /// Deserialize a value written by [`FieldValue::serialize_value`].
    fn deserialize_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

macro_rules! plain_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn serialize_value<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                Serialize::serialize(self, serializer)
            }

            fn deserialize_value<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                <$ty as Deserialize>::deserialize(deserializer)
            }
        }
    )*};
}

plain_field_value!(String, serde_json::Value, InstructionPrefix);

impl FieldValue for f64 {
    fn serialize_value<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_finite() {
            serializer.serialize_f64(*self)
        } else if self.is_nan() {
            serializer.serialize_str("NaN")
        } else if *self > 0.0 {
            serializer.serialize_str(POSITIVE_OVERFLOW)
        } else {
            serializer.serialize_str(NEGATIVE_OVERFLOW)
        }
    }

    fn deserialize_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Numeral(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Numeral(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid numeral `{s}`"))),
        }
    }
}

/// `with` adapter routing `Option<T>` through [`FieldValue`].
mod field_value {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::FieldValue;

    pub(super) fn serialize<T: FieldValue, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => v.serialize_value(serializer),
            None => serializer.serialize_none(),
        }
    }

    struct Value<T>(T);

    impl<'de, T: FieldValue> Deserialize<'de> for Value<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            T::deserialize_value(deserializer).map(Value)
        }
    }

    pub(super) fn deserialize<'de, T: FieldValue, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        Ok(Option::<Value<T>>::deserialize(deserializer)?.map(|Value(v)| v))
    }
}

impl<T> Field<T> {
    /// A field that was not present in the source.
    pub fn absent() -> Self {
        Self {
            value: None,
            span: None,
        }
    }

    /// A field read from `span` with the decoded `value`.
    pub fn present(value: T, span: Span) -> Self {
        Self {
            value: Some(value),
            span: Some(span),
        }
    }

    /// Whether the field consumed any source text.
    pub fn is_present(&self) -> bool {
        self.span.is_some()
    }

    /// Borrow the decoded value.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl Field<String> {
    /// Borrow the decoded text.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A run of consumed whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitespace {
    /// The raw whitespace text.
    pub text: String,
    /// Source range of the run.
    pub span: Span,
}

/// Discriminator of [`Node`], usable without matching on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// `# ...`
    #[serde(rename = "comment")]
    Comment,
    /// `trackName: ...`
    #[serde(rename = "trackName")]
    TrackName,
    /// `<time> <free text>`
    #[serde(rename = "text")]
    Text,
    /// `<time> animmotion <x> <y> <z>`
    #[serde(rename = "motion")]
    Motion,
    /// `<time> animrotation <degrees>`
    #[serde(rename = "rotation")]
    Rotation,
    /// `<time> SpecialFrames_Invincible<json>`
    #[serde(rename = "iframe")]
    Iframe,
    /// `<time> PIE.<prefix><name>|<param>...`
    #[serde(rename = "payload_instruction")]
    PayloadInstruction,
}

impl NodeKind {
    /// The `kind` tag used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Comment => "comment",
            NodeKind::TrackName => "trackName",
            NodeKind::Text => "text",
            NodeKind::Motion => "motion",
            NodeKind::Rotation => "rotation",
            NodeKind::Iframe => "iframe",
            NodeKind::PayloadInstruction => "payload_instruction",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed structure of one annotation line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    /// A comment line.
    #[serde(rename = "comment")]
    Comment(CommentLine),
    /// A track name declaration.
    #[serde(rename = "trackName")]
    TrackName(TrackNameLine),
    /// Plain `<time> <text>` annotation (fallback).
    #[serde(rename = "text")]
    Text(TextLine),
    /// Root motion event.
    #[serde(rename = "motion")]
    Motion(MotionLine),
    /// Root rotation event.
    #[serde(rename = "rotation")]
    Rotation(RotationLine),
    /// Invincibility-frame event with a JSON payload.
    #[serde(rename = "iframe")]
    Iframe(IframeLine),
    /// Payload-interpreter instruction.
    #[serde(rename = "payload_instruction")]
    PayloadInstruction(PayloadInstructionLine),
}

impl Node {
    /// The kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Comment(_) => NodeKind::Comment,
            Node::TrackName(_) => NodeKind::TrackName,
            Node::Text(_) => NodeKind::Text,
            Node::Motion(_) => NodeKind::Motion,
            Node::Rotation(_) => NodeKind::Rotation,
            Node::Iframe(_) => NodeKind::Iframe,
            Node::PayloadInstruction(_) => NodeKind::PayloadInstruction,
        }
    }

    /// The time field of time-bearing lines; `None` for comments and track names.
    pub fn time(&self) -> Option<&Field<f64>> {
        match self {
            Node::Comment(_) | Node::TrackName(_) => None,
            Node::Text(n) => Some(&n.time),
            Node::Motion(n) => Some(&n.time),
            Node::Rotation(n) => Some(&n.time),
            Node::Iframe(n) => Some(&n.time),
            Node::PayloadInstruction(n) => Some(&n.time),
        }
    }

    /// The whitespace between time and event of time-bearing lines.
    pub fn space_time_to_event(&self) -> Option<&Whitespace> {
        match self {
            Node::Comment(_) | Node::TrackName(_) => None,
            Node::Text(n) => n.space_time_to_event.as_ref(),
            Node::Motion(n) => n.space_time_to_event.as_ref(),
            Node::Rotation(n) => n.space_time_to_event.as_ref(),
            Node::Iframe(n) => n.space_time_to_event.as_ref(),
            Node::PayloadInstruction(n) => n.space_time_to_event.as_ref(),
        }
    }

    /// Text left over after the last structured field, for event lines that have one.
    pub fn unparsed(&self) -> Option<&Field<String>> {
        match self {
            Node::Motion(n) => Some(&n.unparsed),
            Node::Rotation(n) => Some(&n.unparsed),
            Node::PayloadInstruction(n) => Some(&n.unparsed),
            _ => None,
        }
    }
}

/// `<ws>#<ws><comment><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// The `#` marker.
    pub marker: Field<String>,
    /// Whitespace after the marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Whitespace>,
    /// Comment text, trailing whitespace excluded.
    pub comment: Field<String>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
}

/// `<ws>trackName:<ws><name><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackNameLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// The `trackName:` keyword, in its source spelling.
    pub keyword: Field<String>,
    /// Whitespace after the keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Whitespace>,
    /// Track name, trailing whitespace excluded.
    pub name: Field<String>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
}

/// `<ws><time> <event text><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// Annotation time in seconds.
    pub time: Field<f64>,
    /// Mandatory separator between time and event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_time_to_event: Option<Whitespace>,
    /// Free-text event or label.
    pub event: Field<String>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
}

/// `<ws><time> animmotion <x> <y> <z><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// Annotation time in seconds.
    pub time: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_time_to_event: Option<Whitespace>,
    /// The `animmotion` keyword.
    pub event: Field<String>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_event_to_x: Option<Whitespace>,
    /// X translation.
    pub x: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_x_to_y: Option<Whitespace>,
    /// Y translation.
    pub y: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_y_to_z: Option<Whitespace>,
    /// Z translation.
    pub z: Field<f64>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
    /// Text after the last field, verbatim to end of line.
    pub unparsed: Field<String>,
}

/// `<ws><time> animrotation <degrees><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// Annotation time in seconds.
    pub time: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_time_to_event: Option<Whitespace>,
    /// The `animrotation` keyword.
    pub event: Field<String>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_event_to_degrees: Option<Whitespace>,
    /// Yaw rotation in degrees.
    pub degrees: Field<f64>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
    /// Text after the last field, verbatim to end of line.
    pub unparsed: Field<String>,
}

/// `<ws><time> SpecialFrames_Invincible<ws><json><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// Annotation time in seconds.
    pub time: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_time_to_event: Option<Whitespace>,
    /// The `SpecialFrames_Invincible` keyword.
    pub event: Field<String>,
    /// Optional padding between keyword and payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_event_to_payload: Option<Whitespace>,
    /// The payload exactly as written.
    pub raw_payload: Field<String>,
    /// The decoded payload; absent when missing or invalid.
    pub payload: Field<serde_json::Value>,
    /// Decoder message when the raw payload is not valid JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
}

/// `<ws><time> <host>.<instruction><ws>`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadInstructionLine {
    /// Leading padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<Whitespace>,
    /// Annotation time in seconds.
    pub time: Field<f64>,
    /// Mandatory separator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_time_to_event: Option<Whitespace>,
    /// Interpreter host before the `.`, normally `PIE`.
    pub event: Field<String>,
    /// The `.` between host and instruction.
    pub dot: Field<String>,
    /// The instruction, when a valid prefix follows the `.`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Instruction>,
    /// Trailing padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Whitespace>,
    /// Text after the `.` that did not start an instruction.
    pub unparsed: Field<String>,
}

/// Instruction prefix character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionPrefix {
    /// `@`: built-in instruction, checked against the native catalog.
    #[serde(rename = "@")]
    Native,
    /// `$`: user-defined instruction.
    #[serde(rename = "$")]
    Custom,
    /// `!`: asynchronous/delayed instruction.
    #[serde(rename = "!")]
    Async,
}

impl InstructionPrefix {
    /// All prefix characters, in declaration order.
    pub const CHARS: [char; 3] = ['@', '$', '!'];

    /// Map a prefix character to its variant.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(InstructionPrefix::Native),
            '$' => Some(InstructionPrefix::Custom),
            '!' => Some(InstructionPrefix::Async),
            _ => None,
        }
    }

    /// The prefix character.
    pub fn as_char(self) -> char {
        match self {
            InstructionPrefix::Native => '@',
            InstructionPrefix::Custom => '$',
            InstructionPrefix::Async => '!',
        }
    }
}

/// `<prefix><name>(|<value>)*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// The one-character prefix.
    pub prefix: Field<InstructionPrefix>,
    /// Instruction name, up to the first `|`.
    pub name: Field<String>,
    /// Parameter list; absent when no `|` follows the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl Instruction {
    /// Number of parameter items (present or empty).
    pub fn parameter_count(&self) -> usize {
        self.parameters.as_ref().map_or(0, |p| p.items.len())
    }
}

/// Ordered parameter items of an instruction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// Items in source order.
    pub items: Vec<ParameterItem>,
}

/// One `|<value>` parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterItem {
    /// The `|` separator.
    pub separator: Field<String>,
    /// Parameter text up to the next `|`; absent for `||`.
    pub value: Field<String>,
}
