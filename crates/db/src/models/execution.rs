//! Execution log entity model and filter DTOs.

use flowboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `execution_logs` table: one workflow run, identified
/// externally by its `run_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExecutionLog {
    pub id: DbId,
    pub run_id: Uuid,
    pub workflow_id: String,
    pub workflow_name: Option<String>,
    pub instance_id: DbId,
    pub status: String,
    pub input_data: serde_json::Value,
    pub output_data: Option<serde_json::Value>,
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Parameters for inserting a new pending execution row.
#[derive(Debug, Clone)]
pub struct NewExecution {
    pub run_id: Uuid,
    pub workflow_id: String,
    pub workflow_name: Option<String>,
    pub instance_id: DbId,
    pub input_data: serde_json::Value,
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
}

/// Query-string filters for listing executions.
#[derive(Debug, Default, Deserialize)]
pub struct ExecutionFilter {
    pub status: Option<String>,
    pub workflow_id: Option<String>,
    pub instance_id: Option<DbId>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
