//! Render plan: a single tagged instruction describing how to display one
//! output value.

use serde::Serialize;
use serde_json::Value;

/// How to display one output value. Exactly one variant is produced per
/// value by [`classify`](super::classify::classify); plans are ephemeral
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderPlan {
    /// Absent value.
    Null,
    /// Boolean badge. `None` marks a value the schema declared boolean but
    /// that could not be read as one (tri-state display).
    Boolean { value: Option<bool> },
    /// Numeric value, rendered with locale-independent grouping.
    Number { value: serde_json::Number },
    /// Short inline text.
    PlainText { text: String },
    /// Long text in block layout.
    LongText { text: String },
    /// Sanitized HTML fragment. The only variant carrying markup; always
    /// passed through [`sanitize_html`](super::sanitize::sanitize_html)
    /// before construction.
    Markup { html: String },
    /// Plain hyperlink.
    Link { href: String },
    /// `mailto:`-style link.
    EmailLink { address: String },
    /// Calendar date or timestamp, displayed as received.
    Date { value: String },
    /// Inline image.
    Image { src: String },
    /// Download link for a document or archive.
    FileDownload { href: String },
    /// Tabular data. Columns are derived from the first row; later rows
    /// with missing keys render empty cells, extra keys are ignored.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Sequence of scalar stringifications, one per item.
    List { items: Vec<String> },
    /// Pretty-printed read-only JSON object.
    NestedJson { value: Value },
    /// Degraded display for unrecognized shapes.
    RawJsonFallback { value: Value },
}
