//! Dashboard entity models and DTOs.

use flowboard_core::schema::{FieldConstraints, FieldSchema};
use flowboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dashboards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dashboard {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub workflow_id: String,
    pub instance_id: DbId,
    pub theme_color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `dashboard_fields` table: one input field definition,
/// ordered by `position` within its dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardField {
    pub id: DbId,
    pub dashboard_id: DbId,
    pub position: i32,
    pub key: String,
    pub kind: String,
    pub label: String,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
    pub constraints: Option<serde_json::Value>,
}

impl DashboardField {
    /// Convert the stored row into the form engine's schema type.
    ///
    /// Stored constraints that fail to deserialize are treated as absent;
    /// a malformed constraint blob must not make a dashboard unrenderable.
    pub fn to_field_schema(&self) -> FieldSchema {
        let constraints = self
            .constraints
            .clone()
            .and_then(|v| serde_json::from_value::<FieldConstraints>(v).ok())
            .unwrap_or_default();
        FieldSchema {
            key: self.key.clone(),
            kind: self.kind.clone(),
            label: self.label.clone(),
            required: self.required,
            default: self.default_value.clone(),
            constraints,
        }
    }
}

/// A dashboard together with its ordered field definitions.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardWithFields {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub fields: Vec<DashboardField>,
}

/// DTO for one field definition in a create request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDashboardField {
    pub key: String,
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub constraints: Option<serde_json::Value>,
}

impl CreateDashboardField {
    /// Schema view of the field, used to compile the form before any
    /// row is written.
    pub fn to_field_schema(&self) -> FieldSchema {
        let constraints = self
            .constraints
            .clone()
            .and_then(|v| serde_json::from_value::<FieldConstraints>(v).ok())
            .unwrap_or_default();
        FieldSchema {
            key: self.key.clone(),
            kind: self.kind.clone(),
            label: self.label.clone(),
            required: self.required,
            default: self.default_value.clone(),
            constraints,
        }
    }
}

/// DTO for creating a dashboard with its fields in one request.
#[derive(Debug, Deserialize)]
pub struct CreateDashboard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub workflow_id: String,
    pub instance_id: DbId,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    #[serde(default)]
    pub fields: Vec<CreateDashboardField>,
}

fn default_theme_color() -> String {
    "blue".to_string()
}

/// Execute request body: the raw form values keyed by field key.
#[derive(Debug, Deserialize)]
pub struct ExecuteDashboard {
    pub inputs: serde_json::Map<String, serde_json::Value>,
}
