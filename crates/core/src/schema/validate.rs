//! Full-form validation: coercion plus constraint checks, pure logic.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::compile::{CompiledField, CompiledForm};
use super::field::FieldKind;

/// Email shape check: one `@`, no whitespace, a dotted domain.
fn is_email_shaped(s: &str) -> bool {
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !local.contains(char::is_whitespace)
                && !domain.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|seg| !seg.is_empty())
        }
        _ => false,
    }
}

/// A single end-user-facing validation failure, keyed to the offending
/// field so the form UI can place it inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub key: String,
    pub message: String,
}

/// Outcome of validating one submission: a normalized value map or an
/// ordered error list, never both.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// All required keys present, all constraints satisfied. Contains only
    /// keys that had a present (or defaulted) value, coerced per kind.
    Valid(Map<String, Value>),
    /// One entry per violation, in schema declaration order.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The error list, empty for valid results.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// The coerced value map, consuming the result. `None` when invalid.
    pub fn into_values(self) -> Option<Map<String, Value>> {
        match self {
            Self::Valid(values) => Some(values),
            Self::Invalid(_) => None,
        }
    }
}

/// Validate raw submitted values against a compiled form.
///
/// This is a full-form pass: every field is checked and every violation is
/// collected before returning, so the user sees all problems in one
/// submission. Validating the same inputs twice yields identical results;
/// there is no hidden state.
pub fn validate(form: &CompiledForm, raw: &Map<String, Value>) -> ValidationResult {
    let mut values = Map::new();
    let mut errors = Vec::new();

    for field in &form.fields {
        let present = raw.get(&field.key).filter(|v| !is_absent(v));

        let raw_value = match present {
            Some(v) => v.clone(),
            None if field.required => {
                errors.push(FieldError {
                    key: field.key.clone(),
                    message: "This field is required".to_string(),
                });
                continue;
            }
            // Declared defaults are substituted before coercion; otherwise
            // the key is omitted from the output map entirely.
            None => match &field.default {
                Some(d) => d.clone(),
                None => continue,
            },
        };

        match coerce(field, &raw_value) {
            Ok(coerced) => {
                let before = errors.len();
                check_constraints(field, &coerced, &mut errors);
                if errors.len() == before {
                    values.insert(field.key.clone(), coerced);
                }
            }
            Err(message) => errors.push(FieldError {
                key: field.key.clone(),
                message,
            }),
        }
    }

    if errors.is_empty() {
        ValidationResult::Valid(values)
    } else {
        ValidationResult::Invalid(errors)
    }
}

/// Absence test for step 1: a missing key, JSON null, or empty string all
/// count as "no value".
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Coerce a raw value to the field's semantic type. Returns the normalized
/// value or a human-readable type-error message.
fn coerce(field: &CompiledField, raw: &Value) -> Result<Value, String> {
    match field.kind {
        FieldKind::String | FieldKind::LongText => match raw {
            Value::String(_) => Ok(raw.clone()),
            _ => Err("Expected a text value".to_string()),
        },
        FieldKind::Email => match raw {
            Value::String(s) if is_email_shaped(s) => Ok(raw.clone()),
            Value::String(_) => Err("Must be a valid email address".to_string()),
            _ => Err("Expected a text value".to_string()),
        },
        FieldKind::Number => coerce_number(raw),
        FieldKind::Integer => coerce_integer(raw),
        FieldKind::Boolean => coerce_boolean(raw),
        FieldKind::Enum => coerce_enum(field, raw),
        FieldKind::File => coerce_file(field, raw),
        FieldKind::Date => match raw {
            Value::String(s)
                if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() =>
            {
                Ok(raw.clone())
            }
            _ => Err("Must be a valid date (YYYY-MM-DD)".to_string()),
        },
        FieldKind::DateTime => match raw {
            Value::String(s) if parses_as_datetime(s) => Ok(raw.clone()),
            _ => Err("Must be a valid date and time".to_string()),
        },
    }
}

fn parses_as_datetime(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
}

/// Numbers are accepted as JSON numbers or parsed from text.
fn coerce_number(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Number(_) => Ok(raw.clone()),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| "Must be a number".to_string()),
            _ => Err("Must be a number".to_string()),
        },
        _ => Err("Must be a number".to_string()),
    }
}

/// Integers additionally reject non-whole values, and whole-valued
/// floats outside the i64 range, which would otherwise saturate in the
/// cast and store a different number than submitted.
fn coerce_integer(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(raw.clone())
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && fits_in_i64(*f)) {
                Ok(Value::Number(Number::from(f as i64)))
            } else {
                Err("Must be a whole number".to_string())
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(Value::Number(Number::from(i)))
            } else {
                match trimmed.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 && fits_in_i64(f) => {
                        Ok(Value::Number(Number::from(f as i64)))
                    }
                    Ok(_) => Err("Must be a whole number".to_string()),
                    Err(_) => Err("Must be a number".to_string()),
                }
            }
        }
        _ => Err("Must be a number".to_string()),
    }
}

/// `i64::MAX as f64` rounds up to 2^63, itself out of range, so the
/// upper bound is exclusive.
fn fits_in_i64(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// Only true/false-equivalent raw values are accepted; anything else is a
/// type error (no 0/1 truthiness).
fn coerce_boolean(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::String(s) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err("Expected true or false".to_string()),
        },
        _ => Err("Expected true or false".to_string()),
    }
}

/// Enum membership is case-sensitive exact match against the declared set.
fn coerce_enum(field: &CompiledField, raw: &Value) -> Result<Value, String> {
    let s = match raw {
        Value::String(s) => s,
        _ => return Err("Expected a text value".to_string()),
    };
    match &field.constraints.values {
        Some(allowed) if allowed.iter().any(|v| v == s) => Ok(raw.clone()),
        Some(allowed) => Err(format!("Must be one of: {}", allowed.join(", "))),
        // No declared set: nothing to check against.
        None => Ok(raw.clone()),
    }
}

/// Files arrive as file-handle-like objects: a `name` and a byte `size`.
/// Content is never inspected; only the optional accept-list is enforced.
fn coerce_file(field: &CompiledField, raw: &Value) -> Result<Value, String> {
    let obj = match raw {
        Value::Object(obj) => obj,
        _ => return Err("Expected a file".to_string()),
    };
    let name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name,
        _ => return Err("Expected a file".to_string()),
    };
    if !obj.get("size").is_some_and(Value::is_number) {
        return Err("Expected a file".to_string());
    }

    if let Some(accept) = &field.constraints.accept {
        let extension = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        let mime = obj.get("type").and_then(Value::as_str).unwrap_or("");
        let accepted = accept.iter().any(|entry| {
            let entry = entry.trim();
            entry.trim_start_matches('.').eq_ignore_ascii_case(&extension)
                || entry.eq_ignore_ascii_case(mime)
        });
        if !accepted {
            return Err(format!("File type is not accepted ({})", accept.join(", ")));
        }
    }

    Ok(raw.clone())
}

/// Bound values in messages print without a trailing `.0`.
fn fmt_bound(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Apply the field's constraints to an already-coerced value. Each
/// violated constraint yields exactly one error naming the violated bound.
fn check_constraints(field: &CompiledField, value: &Value, errors: &mut Vec<FieldError>) {
    let mut push = |message: String| {
        errors.push(FieldError {
            key: field.key.clone(),
            message,
        })
    };

    match field.kind {
        FieldKind::String | FieldKind::LongText | FieldKind::Email => {
            let Some(s) = value.as_str() else { return };
            let len = s.chars().count();
            if let Some(min) = field.constraints.min_length {
                if len < min {
                    push(format!("Minimum length is {min}"));
                }
            }
            if let Some(max) = field.constraints.max_length {
                if len > max {
                    push(format!("Maximum length is {max}"));
                }
            }
            if let Some(re) = &field.pattern {
                if !re.is_match(s) {
                    push("Value does not match the required pattern".to_string());
                }
            }
        }
        FieldKind::Number | FieldKind::Integer => {
            let Some(n) = value.as_f64() else { return };
            if let Some(min) = field.constraints.minimum {
                if n < min {
                    push(format!("Minimum value is {}", fmt_bound(min)));
                }
            }
            if let Some(max) = field.constraints.maximum {
                if n > max {
                    push(format!("Maximum value is {}", fmt_bound(max)));
                }
            }
        }
        // Enum membership and file accept-lists are enforced during
        // coercion; boolean/date kinds carry no applicable constraints.
        FieldKind::Boolean
        | FieldKind::Enum
        | FieldKind::File
        | FieldKind::Date
        | FieldKind::DateTime => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::compile::compile;
    use crate::schema::field::{FieldConstraints, FieldSchema};
    use serde_json::json;

    fn field(key: &str, kind: &str) -> FieldSchema {
        FieldSchema {
            key: key.to_string(),
            kind: kind.to_string(),
            label: key.to_string(),
            required: false,
            default: None,
            constraints: FieldConstraints::default(),
        }
    }

    fn required(mut f: FieldSchema) -> FieldSchema {
        f.required = true;
        f
    }

    fn raw(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn valid_submission_returns_coerced_map() {
        let form = compile(&[
            required(field("name", "string")),
            field("age", "integer"),
        ])
        .unwrap();
        let result = validate(&form, &raw(&[("name", json!("Ada")), ("age", json!("42"))]));
        let values = result.into_values().expect("should be valid");
        assert_eq!(values["name"], json!("Ada"));
        assert_eq!(values["age"], json!(42));
    }

    #[test]
    fn missing_required_field_errors() {
        let form = compile(&[required(field("name", "string"))]).unwrap();
        let result = validate(&form, &raw(&[]));
        assert_eq!(
            result.errors(),
            &[FieldError {
                key: "name".to_string(),
                message: "This field is required".to_string(),
            }]
        );
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let form = compile(&[required(field("name", "string"))]).unwrap();
        let result = validate(&form, &raw(&[("name", json!(""))]));
        assert!(!result.is_valid());
    }

    #[test]
    fn all_required_errors_are_collected_not_just_the_first() {
        let form = compile(&[
            required(field("a", "string")),
            required(field("b", "string")),
            required(field("c", "string")),
        ])
        .unwrap();
        let result = validate(&form, &raw(&[]));
        let keys: Vec<_> = result.errors().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn optional_absent_field_is_omitted_from_output() {
        let form = compile(&[field("note", "string")]).unwrap();
        let values = validate(&form, &raw(&[])).into_values().unwrap();
        assert!(!values.contains_key("note"));
    }

    #[test]
    fn declared_default_is_substituted_and_coerced() {
        let mut f = field("count", "integer");
        f.default = Some(json!("7"));
        let form = compile(&[f]).unwrap();
        let values = validate(&form, &raw(&[])).into_values().unwrap();
        assert_eq!(values["count"], json!(7));
    }

    #[test]
    fn required_field_is_not_rescued_by_a_default() {
        let mut f = required(field("count", "integer"));
        f.default = Some(json!(1));
        let form = compile(&[f]).unwrap();
        assert!(!validate(&form, &raw(&[])).is_valid());
    }

    #[test]
    fn integer_rejects_fractional_values() {
        let form = compile(&[field("age", "integer")]).unwrap();
        let result = validate(&form, &raw(&[("age", json!("3.5"))]));
        assert_eq!(result.errors()[0].message, "Must be a whole number");
    }

    #[test]
    fn integer_rejects_out_of_range_floats() {
        let form = compile(&[field("count", "integer")]).unwrap();

        let result = validate(&form, &raw(&[("count", json!("1e20"))]));
        assert_eq!(result.errors()[0].message, "Must be a whole number");

        let result = validate(&form, &raw(&[("count", json!(1e20))]));
        assert_eq!(result.errors()[0].message, "Must be a whole number");

        // Large but representable values still pass.
        let values = validate(&form, &raw(&[("count", json!("1e15"))]))
            .into_values()
            .unwrap();
        assert_eq!(values["count"], json!(1_000_000_000_000_000_i64));
    }

    #[test]
    fn minimum_value_scenario() {
        let mut f = required(field("age", "integer"));
        f.constraints.minimum = Some(18.0);
        let form = compile(&[f]).unwrap();
        let result = validate(&form, &raw(&[("age", json!("17"))]));
        assert_eq!(
            result.errors(),
            &[FieldError {
                key: "age".to_string(),
                message: "Minimum value is 18".to_string(),
            }]
        );
        // And 18 itself passes.
        let result = validate(&form, &raw(&[("age", json!("18"))]));
        assert!(result.is_valid());
    }

    #[test]
    fn email_scenario() {
        let form = compile(&[required(field("email", "email"))]).unwrap();

        let result = validate(&form, &raw(&[("email", json!("not-an-email"))]));
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, "email");
        assert_eq!(errors[0].message, "Must be a valid email address");

        let result = validate(&form, &raw(&[("email", json!("a@b.com"))]));
        let values = result.into_values().unwrap();
        assert_eq!(values["email"], json!("a@b.com"));
    }

    #[test]
    fn min_length_message_names_the_bound() {
        let mut f = field("code", "string");
        f.constraints.min_length = Some(3);
        let form = compile(&[f]).unwrap();
        let result = validate(&form, &raw(&[("code", json!("ab"))]));
        assert_eq!(result.errors()[0].message, "Minimum length is 3");
    }

    #[test]
    fn multiple_violations_on_one_field_each_produce_an_error() {
        let mut f = field("code", "string");
        f.constraints.min_length = Some(5);
        f.constraints.pattern = Some("^[a-z]+$".to_string());
        let form = compile(&[f]).unwrap();
        let result = validate(&form, &raw(&[("code", json!("AB1"))]));
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn boolean_accepts_only_true_false_equivalents() {
        let form = compile(&[field("flag", "boolean")]).unwrap();

        let values = validate(&form, &raw(&[("flag", json!("true"))]))
            .into_values()
            .unwrap();
        assert_eq!(values["flag"], json!(true));

        let result = validate(&form, &raw(&[("flag", json!(1))]));
        assert_eq!(result.errors()[0].message, "Expected true or false");
    }

    #[test]
    fn enum_membership_is_case_sensitive() {
        let mut f = field("color", "enum");
        f.constraints.values = Some(vec!["red".into(), "blue".into()]);
        let form = compile(&[f]).unwrap();

        assert!(validate(&form, &raw(&[("color", json!("red"))])).is_valid());
        let result = validate(&form, &raw(&[("color", json!("Red"))]));
        assert_eq!(result.errors()[0].message, "Must be one of: red, blue");
    }

    #[test]
    fn file_requires_name_and_size() {
        let form = compile(&[field("upload", "file")]).unwrap();

        let ok = raw(&[("upload", json!({"name": "report.pdf", "size": 1024}))]);
        assert!(validate(&form, &ok).is_valid());

        let missing_size = raw(&[("upload", json!({"name": "report.pdf"}))]);
        assert!(!validate(&form, &missing_size).is_valid());

        let not_a_file = raw(&[("upload", json!("report.pdf"))]);
        assert!(!validate(&form, &not_a_file).is_valid());
    }

    #[test]
    fn file_accept_list_checks_extension_case_insensitively() {
        let mut f = field("upload", "file");
        f.constraints.accept = Some(vec![".pdf".into(), "text/csv".into()]);
        let form = compile(&[f]).unwrap();

        let pdf = raw(&[("upload", json!({"name": "Q3.PDF", "size": 10}))]);
        assert!(validate(&form, &pdf).is_valid());

        let csv_by_mime = raw(&[(
            "upload",
            json!({"name": "data.bin", "size": 10, "type": "text/csv"}),
        )]);
        assert!(validate(&form, &csv_by_mime).is_valid());

        let exe = raw(&[("upload", json!({"name": "setup.exe", "size": 10}))]);
        assert!(!validate(&form, &exe).is_valid());
    }

    #[test]
    fn date_and_datetime_parsing() {
        let form = compile(&[field("day", "date"), field("at", "date-time")]).unwrap();

        let ok = raw(&[
            ("day", json!("2026-08-25")),
            ("at", json!("2026-08-25T10:30:00Z")),
        ]);
        assert!(validate(&form, &ok).is_valid());

        let bad = raw(&[("day", json!("25/08/2026"))]);
        assert_eq!(
            validate(&form, &bad).errors()[0].message,
            "Must be a valid date (YYYY-MM-DD)"
        );
    }

    #[test]
    fn inapplicable_constraints_are_ignored() {
        // A minimum on a string field means nothing and must not error.
        let mut f = field("name", "string");
        f.constraints.minimum = Some(5.0);
        let form = compile(&[f]).unwrap();
        assert!(validate(&form, &raw(&[("name", json!("ab"))])).is_valid());
    }

    #[test]
    fn errors_follow_schema_declaration_order() {
        let mut age = required(field("age", "integer"));
        age.constraints.minimum = Some(18.0);
        let form = compile(&[
            required(field("name", "string")),
            age,
            required(field("email", "email")),
        ])
        .unwrap();
        let result = validate(
            &form,
            &raw(&[("age", json!(10)), ("email", json!("nope"))]),
        );
        let keys: Vec<_> = result.errors().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "age", "email"]);
    }

    #[test]
    fn validation_is_idempotent() {
        let mut f = required(field("age", "integer"));
        f.constraints.minimum = Some(18.0);
        let form = compile(&[f]).unwrap();
        let input = raw(&[("age", json!("17"))]);
        let first = validate(&form, &input);
        let second = validate(&form, &input);
        assert_eq!(first.errors(), second.errors());
    }

    #[test]
    fn unknown_submitted_keys_are_ignored() {
        let form = compile(&[field("name", "string")]).unwrap();
        let values = validate(&form, &raw(&[("name", json!("x")), ("extra", json!(1))]))
            .into_values()
            .unwrap();
        assert!(!values.contains_key("extra"));
    }
}
