//! Value classification: the precedence-ordered rule set that picks a
//! [`RenderPlan`] variant for one output value.

use serde_json::Value;

use super::plan::RenderPlan;
use super::sanitize::sanitize_html;
use crate::schema::{FieldKind, FieldSchema};

/// Strings longer than this render in block layout rather than inline.
const LONG_TEXT_THRESHOLD: usize = 100;

/// File-extension suffixes rendered as inline images.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// File-extension suffixes rendered as download links.
const FILE_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".csv", ".zip", ".tar", ".gz",
    ".7z",
];

/// Classify a value into exactly one render plan.
///
/// Rule precedence is fixed and string-shape detection runs before generic
/// type detection: most signal in heterogeneous workflow outputs is
/// carried in string formatting (URLs, markup, file extensions) rather
/// than declared types. An explicit schema-hinted kind (boolean, email,
/// date, date-time, file) wins over inference, but never over null.
///
/// This function has no error path: anything it cannot recognize degrades
/// to the raw-JSON fallback, because failing to render an unusual output
/// is worse than degrading its display. Stateless and non-recursive into
/// nested tables, so each call's cost is linear in input size.
pub fn classify(value: &Value, schema_hint: Option<&FieldSchema>) -> RenderPlan {
    // Rule 1: null beats everything, including hints.
    if value.is_null() {
        return RenderPlan::Null;
    }

    // Rule 2: explicit schema kinds are honored regardless of value shape.
    if let Some(kind) = schema_hint.and_then(|hint| FieldKind::parse(&hint.kind)) {
        match kind {
            FieldKind::Boolean => {
                return RenderPlan::Boolean {
                    value: read_booleanish(value),
                }
            }
            FieldKind::Email => {
                return RenderPlan::EmailLink {
                    address: scalar_text(value),
                }
            }
            FieldKind::Date | FieldKind::DateTime => {
                return RenderPlan::Date {
                    value: scalar_text(value),
                }
            }
            FieldKind::File => {
                return RenderPlan::FileDownload {
                    href: file_href(value),
                }
            }
            // Text and numeric kinds carry no display-changing signal
            // beyond what inference already derives.
            _ => {}
        }
    }

    // Rule 3: bare booleans.
    if let Value::Bool(b) = value {
        return RenderPlan::Boolean { value: Some(*b) };
    }

    if let Value::String(s) = value {
        return classify_string(s);
    }

    // Rule 7/8: sequences, records first.
    if let Value::Array(items) = value {
        if let Some(Value::Object(first)) = items.first() {
            return table_plan(first, items);
        }
        return RenderPlan::List {
            items: items.iter().map(scalar_text).collect(),
        };
    }

    // Rule 9: numbers.
    if let Value::Number(n) = value {
        return RenderPlan::Number { value: n.clone() };
    }

    // Rule 12: keyed records without a matching hint.
    if value.is_object() {
        return RenderPlan::NestedJson {
            value: value.clone(),
        };
    }

    // Rule 13: unreachable for JSON values today, kept as the terminal
    // degradation path.
    RenderPlan::RawJsonFallback {
        value: value.clone(),
    }
}

/// Rules 4-6 and 10-11: string-shape detection in precedence order.
fn classify_string(s: &str) -> RenderPlan {
    let trimmed = s.trim();
    let lower = trimmed.to_ascii_lowercase();

    // Rule 4: image extensions.
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return RenderPlan::Image {
            src: trimmed.to_string(),
        };
    }

    // Rule 5: document/archive extensions.
    if FILE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return RenderPlan::FileDownload {
            href: trimmed.to_string(),
        };
    }

    // Rule 5b: bare URLs that matched neither extension family.
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return RenderPlan::Link {
            href: trimmed.to_string(),
        };
    }

    // Rule 6: markup-ish strings are sanitized, never passed through raw.
    if s.contains('<') && s.contains('>') {
        return RenderPlan::Markup {
            html: sanitize_html(s),
        };
    }

    // Rules 10-11: length decides inline vs block layout.
    if s.chars().count() > LONG_TEXT_THRESHOLD {
        RenderPlan::LongText {
            text: s.to_string(),
        }
    } else {
        RenderPlan::PlainText {
            text: s.to_string(),
        }
    }
}

/// Rule 7: columns come from the first row only; later rows with missing
/// keys render empty cells and extra keys are ignored.
fn table_plan(first: &serde_json::Map<String, Value>, items: &[Value]) -> RenderPlan {
    let columns: Vec<String> = first.keys().cloned().collect();
    let rows: Vec<Vec<Value>> = items
        .iter()
        .map(|item| match item {
            Value::Object(record) => columns
                .iter()
                .map(|col| record.get(col).cloned().unwrap_or(Value::Null))
                .collect(),
            // A non-record row in a record sequence has no cells.
            _ => vec![Value::Null; columns.len()],
        })
        .collect();
    RenderPlan::Table { columns, rows }
}

/// Tri-state boolean reading for schema-hinted booleans: accepts real
/// booleans, 0/1 numerics, and "true"/"false" text; anything else is
/// unknown.
fn read_booleanish(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Scalar stringification used for list items and hinted scalars. No
/// recursive classification: nested structures flatten to compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Best-effort download target for a schema-hinted file value.
fn file_href(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("href"))
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| scalar_text(value)),
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn hint(kind: FieldKind) -> FieldSchema {
        FieldSchema::new("out", kind, "out")
    }

    #[test]
    fn null_wins_over_any_hint() {
        let h = hint(FieldKind::Boolean);
        assert_eq!(classify(&Value::Null, Some(&h)), RenderPlan::Null);
        assert_eq!(classify(&Value::Null, None), RenderPlan::Null);
    }

    #[test]
    fn boolean_hint_reads_numeric_zero_one() {
        let h = hint(FieldKind::Boolean);
        assert_eq!(
            classify(&json!(1), Some(&h)),
            RenderPlan::Boolean { value: Some(true) }
        );
        assert_eq!(
            classify(&json!(0), Some(&h)),
            RenderPlan::Boolean {
                value: Some(false)
            }
        );
        // Unreadable values stay tri-state unknown rather than erroring.
        assert_eq!(
            classify(&json!("maybe"), Some(&h)),
            RenderPlan::Boolean { value: None }
        );
    }

    #[test]
    fn email_and_date_hints_win_over_inference() {
        let result = classify(&json!("ops@example.com"), Some(&hint(FieldKind::Email)));
        assert_eq!(
            result,
            RenderPlan::EmailLink {
                address: "ops@example.com".to_string()
            }
        );

        let result = classify(&json!("2026-08-25"), Some(&hint(FieldKind::Date)));
        assert_matches!(result, RenderPlan::Date { value } if value == "2026-08-25");
    }

    #[test]
    fn file_hint_extracts_href_from_objects() {
        let h = hint(FieldKind::File);
        let result = classify(&json!({"url": "/files/a.bin", "size": 12}), Some(&h));
        assert_matches!(result, RenderPlan::FileDownload { href } if href == "/files/a.bin");
    }

    #[test]
    fn bare_booleans_without_hint() {
        assert_eq!(
            classify(&json!(true), None),
            RenderPlan::Boolean { value: Some(true) }
        );
    }

    #[test]
    fn image_extensions_case_insensitive() {
        for name in [
            "chart.png", "photo.JPG", "pic.jpeg", "anim.gif", "img.WebP", "icon.svg",
        ] {
            assert_matches!(
                classify(&json!(name), None),
                RenderPlan::Image { .. },
                "{name} should classify as image"
            );
        }
    }

    #[test]
    fn document_extensions_become_downloads() {
        assert_matches!(
            classify(&json!("report.pdf"), None),
            RenderPlan::FileDownload { href } if href == "report.pdf"
        );
        assert_matches!(
            classify(&json!("export.CSV"), None),
            RenderPlan::FileDownload { .. }
        );
    }

    #[test]
    fn image_url_is_image_not_link() {
        assert_matches!(
            classify(&json!("https://cdn.example.com/a.png"), None),
            RenderPlan::Image { .. }
        );
    }

    #[test]
    fn bare_urls_become_links() {
        assert_matches!(
            classify(&json!("https://example.com/status"), None),
            RenderPlan::Link { href } if href == "https://example.com/status"
        );
    }

    #[test]
    fn markup_is_always_sanitized() {
        let result = classify(&json!("<b>hi</b><script>alert(1)</script>"), None);
        let RenderPlan::Markup { html } = result else {
            panic!("expected markup variant");
        };
        assert_eq!(html, "<b>hi</b>");
        assert!(!html.contains("script"));
    }

    #[test]
    fn onerror_never_survives_classification() {
        let result = classify(&json!("<img src=x.png onerror=alert(1)>"), None);
        let RenderPlan::Markup { html } = result else {
            panic!("expected markup variant");
        };
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn record_sequence_becomes_table_with_first_row_columns() {
        let value = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
        let result = classify(&value, None);
        let RenderPlan::Table { columns, rows } = result else {
            panic!("expected table variant");
        };
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![json!(2), json!("b")]);
    }

    #[test]
    fn later_row_extra_keys_ignored_missing_cells_null() {
        let value = json!([{"id": 1}, {"id": 2, "surprise": true}, {"other": 3}]);
        let RenderPlan::Table { columns, rows } = classify(&value, None) else {
            panic!("expected table variant");
        };
        assert_eq!(columns, vec!["id"]);
        assert_eq!(rows[1], vec![json!(2)]);
        assert_eq!(rows[2], vec![Value::Null]);
    }

    #[test]
    fn scalar_sequence_becomes_list() {
        let result = classify(&json!(["a", 2, true]), None);
        assert_eq!(
            result,
            RenderPlan::List {
                items: vec!["a".to_string(), "2".to_string(), "true".to_string()]
            }
        );
    }

    #[test]
    fn no_recursive_table_detection_inside_lists() {
        // First element is an array, so this is a list; the nested record
        // sequence flattens to JSON text instead of a nested table.
        let value = json!([[{"id": 1}], [{"id": 2}]]);
        let RenderPlan::List { items } = classify(&value, None) else {
            panic!("expected list variant");
        };
        assert_eq!(items[0], r#"[{"id":1}]"#);
    }

    #[test]
    fn numbers_and_text_thresholds() {
        assert_matches!(classify(&json!(42), None), RenderPlan::Number { .. });
        assert_eq!(
            classify(&json!("short"), None),
            RenderPlan::PlainText {
                text: "short".to_string()
            }
        );
        let long = "x".repeat(150);
        assert_matches!(classify(&json!(long), None), RenderPlan::LongText { .. });
        // Exactly at the threshold stays inline.
        let at = "y".repeat(100);
        assert_matches!(classify(&json!(at), None), RenderPlan::PlainText { .. });
    }

    #[test]
    fn plain_objects_become_nested_json() {
        let value = json!({"nested": {"deep": 1}});
        assert_eq!(
            classify(&value, None),
            RenderPlan::NestedJson {
                value: value.clone()
            }
        );
    }

    #[test]
    fn classification_is_pure() {
        let value = json!([{"id": 1, "name": "a"}]);
        assert_eq!(classify(&value, None), classify(&value, None));
    }
}
