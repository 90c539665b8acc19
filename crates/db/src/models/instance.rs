//! Workflow-automation instance entity model and DTOs.

use flowboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `instances` table: one connected workflow-automation
/// server. The API key never serializes into responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Instance {
    pub id: DbId,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for connecting a new instance.
#[derive(Debug, Deserialize)]
pub struct CreateInstance {
    pub name: String,
    pub url: String,
    pub api_key: String,
}

/// DTO for updating an instance's connection settings.
#[derive(Debug, Deserialize)]
pub struct UpdateInstance {
    pub name: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub is_active: Option<bool>,
}
