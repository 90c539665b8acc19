//! Schema compilation: structural checks done once, ahead of validation.

use std::collections::HashSet;

use regex::Regex;

use super::field::{FieldConstraints, FieldKind, FieldSchema};

/// Author-time schema malformation. Not retryable; the schema itself must
/// be fixed. Never shown to end users submitting a form.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Duplicate field key: {key}")]
    DuplicateKey { key: String },

    #[error("Unknown field kind '{kind}' for key '{key}'")]
    UnknownKind { key: String, kind: String },
}

/// A field schema with its kind resolved and its pattern pre-compiled.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub key: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub constraints: FieldConstraints,
    /// Pre-compiled `constraints.pattern`. An unparsable pattern is
    /// dropped here and the constraint silently passes during validation.
    pub pattern: Option<Regex>,
}

/// The validator artifact produced once per schema and reused across
/// submissions. Field order matches schema declaration order.
#[derive(Debug, Clone, Default)]
pub struct CompiledForm {
    pub fields: Vec<CompiledField>,
}

impl CompiledForm {
    /// Look up a compiled field by key.
    pub fn field(&self, key: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Compile an ordered sequence of field schemas into a [`CompiledForm`].
///
/// Fails only on structural malformation: a duplicate `key` or an
/// unrecognized `kind`. Side-effect-free.
pub fn compile(schemas: &[FieldSchema]) -> Result<CompiledForm, SchemaError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(schemas.len());
    let mut fields = Vec::with_capacity(schemas.len());

    for schema in schemas {
        if !seen.insert(schema.key.as_str()) {
            return Err(SchemaError::DuplicateKey {
                key: schema.key.clone(),
            });
        }

        let kind = FieldKind::parse(&schema.kind).ok_or_else(|| SchemaError::UnknownKind {
            key: schema.key.clone(),
            kind: schema.kind.clone(),
        })?;

        let pattern = schema
            .constraints
            .pattern
            .as_deref()
            .and_then(|p| Regex::new(p).ok());

        fields.push(CompiledField {
            key: schema.key.clone(),
            kind,
            label: schema.label.clone(),
            required: schema.required,
            default: schema.default.clone(),
            constraints: schema.constraints.clone(),
            pattern,
        });
    }

    Ok(CompiledForm { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn schema(key: &str, kind: &str) -> FieldSchema {
        FieldSchema {
            key: key.to_string(),
            kind: kind.to_string(),
            label: key.to_string(),
            required: false,
            default: None,
            constraints: FieldConstraints::default(),
        }
    }

    #[test]
    fn compiles_all_recognized_kinds() {
        let kinds = [
            "string",
            "number",
            "integer",
            "boolean",
            "enum",
            "long-text",
            "email",
            "file",
            "date",
            "date-time",
        ];
        let schemas: Vec<_> = kinds.iter().map(|k| schema(k, k)).collect();
        let form = compile(&schemas).expect("all kinds should compile");
        assert_eq!(form.fields.len(), kinds.len());
        // Declaration order is preserved.
        assert_eq!(form.fields[0].key, "string");
        assert_eq!(form.fields[9].kind, FieldKind::DateTime);
    }

    #[test]
    fn duplicate_key_is_a_schema_error() {
        let schemas = vec![schema("name", "string"), schema("name", "number")];
        assert_matches!(
            compile(&schemas),
            Err(SchemaError::DuplicateKey { key }) if key == "name"
        );
    }

    #[test]
    fn unknown_kind_is_a_schema_error() {
        let schemas = vec![schema("x", "telepathy")];
        assert_matches!(
            compile(&schemas),
            Err(SchemaError::UnknownKind { key, kind }) if key == "x" && kind == "telepathy"
        );
    }

    #[test]
    fn invalid_pattern_is_dropped_not_an_error() {
        let mut s = schema("code", "string");
        s.constraints.pattern = Some("([unclosed".to_string());
        let form = compile(&[s]).expect("invalid pattern must not fail compile");
        assert!(form.fields[0].pattern.is_none());
    }

    #[test]
    fn valid_pattern_is_precompiled() {
        let mut s = schema("code", "string");
        s.constraints.pattern = Some("^[a-z]+$".to_string());
        let form = compile(&[s]).unwrap();
        assert!(form.fields[0].pattern.as_ref().unwrap().is_match("abc"));
    }

    #[test]
    fn empty_schema_compiles_to_empty_form() {
        let form = compile(&[]).unwrap();
        assert!(form.fields.is_empty());
    }
}
