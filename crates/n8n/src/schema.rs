//! Form field extraction from raw workflow JSON.
//!
//! Workflows describe their expected input as a JSON-Schema-style object
//! on the trigger node (`parameters.schema`) and, optionally, their output
//! shape on the final node. These functions map that subset onto ordered
//! [`FieldSchema`] lists for the form engine.

use flowboard_core::schema::{FieldConstraints, FieldKind, FieldSchema};
use serde::Serialize;
use serde_json::Value;

/// How a workflow starts, derived from its node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Webhook,
    Manual,
    Trigger,
    Unknown,
}

/// Extract the input field list from a workflow definition.
///
/// Looks for the first trigger-like node (type containing `trigger`,
/// `webhook`, or `manual`), falling back to the first node, and converts
/// its `parameters.schema`. A workflow without a schema yields an empty
/// list.
pub fn parse_input_schema(workflow: &Value) -> Vec<FieldSchema> {
    let Some(node) = find_trigger_node(workflow) else {
        return Vec::new();
    };
    node.pointer("/parameters/schema")
        .map(convert_schema)
        .unwrap_or_default()
}

/// Extract the output field list from a workflow definition.
///
/// The last node is the conventional output node; its
/// `parameters.output_schema` (or `parameters.schema`) describes the
/// result shape used as rendering hints.
pub fn parse_output_schema(workflow: &Value) -> Vec<FieldSchema> {
    let Some(last) = workflow
        .get("nodes")
        .and_then(Value::as_array)
        .and_then(|nodes| nodes.last())
    else {
        return Vec::new();
    };
    let params = last.get("parameters");
    params
        .and_then(|p| p.get("output_schema"))
        .or_else(|| params.and_then(|p| p.get("schema")))
        .map(convert_schema)
        .unwrap_or_default()
}

/// Classify how a workflow is triggered, scanning nodes in order.
pub fn detect_trigger_type(workflow: &Value) -> TriggerType {
    let Some(nodes) = workflow.get("nodes").and_then(Value::as_array) else {
        return TriggerType::Unknown;
    };
    for node in nodes {
        let node_type = node_type_lower(node);
        if node_type.contains("webhook") {
            return TriggerType::Webhook;
        }
        if node_type.contains("manual") || node_type.contains("execute") {
            return TriggerType::Manual;
        }
        if node_type.contains("trigger") {
            return TriggerType::Trigger;
        }
    }
    TriggerType::Unknown
}

// ---- private helpers ----

fn node_type_lower(node: &Value) -> String {
    node.get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn find_trigger_node(workflow: &Value) -> Option<&Value> {
    let nodes = workflow.get("nodes").and_then(Value::as_array)?;
    nodes
        .iter()
        .find(|node| {
            let node_type = node_type_lower(node);
            ["trigger", "webhook", "manual"]
                .iter()
                .any(|t| node_type.contains(t))
        })
        .or_else(|| nodes.first())
}

/// Convert a JSON-Schema-style object into an ordered field list.
/// Property order is the declaration order of the schema.
fn convert_schema(schema: &Value) -> Vec<FieldSchema> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(key, prop)| convert_property(key, prop, required.contains(&key.as_str())))
        .collect()
}

fn convert_property(key: &str, prop: &Value, required: bool) -> FieldSchema {
    let label = prop
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| label_from_key(key));

    let constraints = FieldConstraints {
        minimum: prop.get("minimum").and_then(Value::as_f64),
        maximum: prop.get("maximum").and_then(Value::as_f64),
        min_length: prop
            .get("minLength")
            .and_then(Value::as_u64)
            .map(|v| v as usize),
        max_length: prop
            .get("maxLength")
            .and_then(Value::as_u64)
            .map(|v| v as usize),
        pattern: prop
            .get("pattern")
            .and_then(Value::as_str)
            .map(str::to_string),
        values: prop.get("enum").and_then(Value::as_array).map(|vals| {
            vals.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        }),
        accept: None,
    };

    FieldSchema {
        key: key.to_string(),
        kind: resolve_kind(prop).as_str().to_string(),
        label,
        required,
        default: prop.get("default").cloned(),
        constraints,
    }
}

/// Map a property's `type`/`format`/`enum` onto a field kind.
fn resolve_kind(prop: &Value) -> FieldKind {
    if prop.get("enum").is_some() {
        return FieldKind::Enum;
    }
    let prop_type = prop.get("type").and_then(Value::as_str).unwrap_or("string");
    match prop_type {
        "number" => FieldKind::Number,
        "integer" => FieldKind::Integer,
        "boolean" => FieldKind::Boolean,
        _ => match prop.get("format").and_then(Value::as_str) {
            Some("email") => FieldKind::Email,
            Some("date") => FieldKind::Date,
            Some("date-time") => FieldKind::DateTime,
            Some("textarea") | Some("long-text") => FieldKind::LongText,
            Some("binary") | Some("data-url") => FieldKind::File,
            _ => FieldKind::String,
        },
    }
}

/// Derive a display label from a snake_case or kebab-case key.
fn label_from_key(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_workflow() -> Value {
        json!({
            "id": "wf1",
            "name": "Customer intake",
            "nodes": [
                {
                    "name": "Webhook",
                    "type": "n8n-nodes-base.webhook",
                    "parameters": {
                        "path": "intake",
                        "httpMethod": "POST",
                        "schema": {
                            "type": "object",
                            "properties": {
                                "email_body": {
                                    "type": "string",
                                    "title": "Email body",
                                    "maxLength": 5000
                                },
                                "customer_email": { "type": "string", "format": "email" },
                                "age": { "type": "integer", "minimum": 18 },
                                "tier": { "enum": ["free", "pro"] }
                            },
                            "required": ["email_body"]
                        }
                    }
                },
                {
                    "name": "Respond",
                    "type": "n8n-nodes-base.respondToWebhook",
                    "parameters": {
                        "output_schema": {
                            "type": "object",
                            "properties": {
                                "summary": { "type": "string" },
                                "score": { "type": "number" }
                            }
                        }
                    }
                }
            ]
        })
    }

    #[test]
    fn input_schema_preserves_declaration_order() {
        let fields = parse_input_schema(&sample_workflow());
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["email_body", "customer_email", "age", "tier"]);
    }

    #[test]
    fn input_schema_maps_kinds_and_constraints() {
        let fields = parse_input_schema(&sample_workflow());

        assert_eq!(fields[0].kind, "string");
        assert_eq!(fields[0].label, "Email body");
        assert!(fields[0].required);
        assert_eq!(fields[0].constraints.max_length, Some(5000));

        assert_eq!(fields[1].kind, "email");
        assert_eq!(fields[1].label, "Customer email");
        assert!(!fields[1].required);

        assert_eq!(fields[2].kind, "integer");
        assert_eq!(fields[2].constraints.minimum, Some(18.0));

        assert_eq!(fields[3].kind, "enum");
        assert_eq!(
            fields[3].constraints.values,
            Some(vec!["free".to_string(), "pro".to_string()])
        );
    }

    #[test]
    fn missing_schema_yields_empty_list() {
        let workflow = json!({
            "nodes": [{ "name": "Manual", "type": "n8n-nodes-base.manualTrigger" }]
        });
        assert!(parse_input_schema(&workflow).is_empty());
        assert!(parse_input_schema(&json!({})).is_empty());
    }

    #[test]
    fn falls_back_to_first_node_without_trigger() {
        let workflow = json!({
            "nodes": [{
                "name": "Set",
                "type": "n8n-nodes-base.set",
                "parameters": {
                    "schema": {
                        "type": "object",
                        "properties": { "note": { "type": "string" } }
                    }
                }
            }]
        });
        let fields = parse_input_schema(&workflow);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "note");
    }

    #[test]
    fn output_schema_reads_last_node() {
        let fields = parse_output_schema(&sample_workflow());
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["summary", "score"]);
        assert_eq!(fields[1].kind, "number");
    }

    #[test]
    fn trigger_type_detection() {
        assert_eq!(detect_trigger_type(&sample_workflow()), TriggerType::Webhook);

        let manual = json!({
            "nodes": [{ "type": "n8n-nodes-base.manualTrigger" }]
        });
        assert_eq!(detect_trigger_type(&manual), TriggerType::Manual);

        let cron = json!({
            "nodes": [{ "type": "n8n-nodes-base.cronTrigger" }]
        });
        assert_eq!(detect_trigger_type(&cron), TriggerType::Trigger);

        let none = json!({
            "nodes": [{ "type": "n8n-nodes-base.set" }]
        });
        assert_eq!(detect_trigger_type(&none), TriggerType::Unknown);
        assert_eq!(detect_trigger_type(&json!({})), TriggerType::Unknown);
    }

    #[test]
    fn generated_labels_humanize_keys() {
        assert_eq!(label_from_key("customer_email"), "Customer email");
        assert_eq!(label_from_key("theme-color"), "Theme color");
    }
}
