//! Field schema types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative description of one input field.
///
/// Instances are constructed when a workflow or dashboard schema is loaded
/// and are immutable thereafter; edits produce a new schema version.
///
/// `kind` is carried as a loose string because schemas arrive from workflow
/// JSON authored outside this system. [`compile`](super::compile::compile)
/// resolves it to the closed [`FieldKind`] enum and rejects unknown values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Unique identifier within the schema; doubles as the payload key.
    pub key: String,
    /// Field kind name, e.g. `"string"`, `"integer"`, `"date-time"`.
    pub kind: String,
    /// Human-readable label shown next to the form control.
    pub label: String,
    /// Whether absence of a value is a validation error.
    #[serde(default)]
    pub required: bool,
    /// Optional pre-filled value matching `kind`. Substituted before
    /// coercion when the field is absent from the submitted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Kind-dependent constraints. Entries inapplicable to `kind` are
    /// ignored, never erroring.
    #[serde(default, skip_serializing_if = "FieldConstraints::is_empty")]
    pub constraints: FieldConstraints,
}

impl FieldSchema {
    /// Shorthand constructor for an unconstrained, optional field.
    pub fn new(key: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: kind.as_str().to_string(),
            label: label.into(),
            required: false,
            default: None,
            constraints: FieldConstraints::default(),
        }
    }
}

/// The closed set of recognized field kinds.
///
/// Determines both the coercion applied to a raw value and which
/// [`FieldConstraints`] entries are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Enum,
    LongText,
    Email,
    File,
    Date,
    DateTime,
}

impl FieldKind {
    /// Resolve a kind name to the closed enum. Returns `None` for
    /// unrecognized names; callers decide whether that is an error
    /// (compile) or ignorable (render hints).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "enum" => Some(Self::Enum),
            "long-text" => Some(Self::LongText),
            "email" => Some(Self::Email),
            "file" => Some(Self::File),
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Canonical kind name, the inverse of [`parse`](Self::parse).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::LongText => "long-text",
            Self::Email => "email",
            Self::File => "file",
            Self::Date => "date",
            Self::DateTime => "date-time",
        }
    }
}

/// Kind-dependent validation constraints.
///
/// One open struct rather than per-kind sub-types: schemas arrive from
/// loosely-shaped workflow JSON, and the contract is that constraints a
/// kind does not understand are silently ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConstraints {
    /// Lower bound for number/integer values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Upper bound for number/integer values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum character count for text values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum character count for text values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression a text value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values for enum fields (ordered, case-sensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Accepted file extensions or MIME types for file fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,
}

impl FieldConstraints {
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.values.is_none()
            && self.accept.is_none()
    }
}
