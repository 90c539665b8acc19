//! Repository for the `execution_logs` table.

use flowboard_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::execution::{ExecutionFilter, ExecutionLog, NewExecution};

/// Column list for `execution_logs` queries.
const COLUMNS: &str = "\
    id, run_id, workflow_id, workflow_name, instance_id, status, \
    input_data, output_data, input_schema, output_schema, error_message, \
    created_at, started_at, completed_at";

/// Default page size for execution listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for execution listing.
const MAX_LIMIT: i64 = 200;

/// Provides insert, lookup, and status transitions for execution logs.
pub struct ExecutionRepo;

impl ExecutionRepo {
    /// Insert a new execution row in the 'pending' state.
    pub async fn create(pool: &PgPool, input: &NewExecution) -> Result<ExecutionLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO execution_logs (\
                run_id, workflow_id, workflow_name, instance_id, \
                input_data, input_schema, output_schema\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExecutionLog>(&query)
            .bind(input.run_id)
            .bind(&input.workflow_id)
            .bind(input.workflow_name.as_deref())
            .bind(input.instance_id)
            .bind(&input.input_data)
            .bind(input.input_schema.as_ref())
            .bind(input.output_schema.as_ref())
            .fetch_one(pool)
            .await
    }

    /// Find an execution by its run ID.
    pub async fn find_by_run_id(
        pool: &PgPool,
        run_id: Uuid,
    ) -> Result<Option<ExecutionLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM execution_logs WHERE run_id = $1");
        sqlx::query_as::<_, ExecutionLog>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }

    /// List executions with optional filters and pagination, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ExecutionFilter,
    ) -> Result<Vec<ExecutionLog>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = filter.offset.unwrap_or(0).max(0);

        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.workflow_id.is_some() {
            conditions.push(format!("workflow_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.instance_id.is_some() {
            conditions.push(format!("instance_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.start_date.is_some() {
            conditions.push(format!("created_at >= ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.end_date.is_some() {
            conditions.push(format!("created_at <= ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM execution_logs \
             {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ExecutionLog>(&query);

        // Bind dynamic parameters in order.
        if let Some(ref status) = filter.status {
            q = q.bind(status);
        }
        if let Some(ref workflow_id) = filter.workflow_id {
            q = q.bind(workflow_id);
        }
        if let Some(instance_id) = filter.instance_id {
            q = q.bind(instance_id);
        }
        if let Some(start_date) = filter.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            q = q.bind(end_date);
        }

        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Transition an execution to 'running' and stamp `started_at`.
    pub async fn mark_running(
        pool: &PgPool,
        run_id: Uuid,
    ) -> Result<Option<ExecutionLog>, sqlx::Error> {
        let query = format!(
            "UPDATE execution_logs \
             SET status = 'running', started_at = NOW() \
             WHERE run_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExecutionLog>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition an execution to 'success', store the workflow output,
    /// and stamp `completed_at`.
    pub async fn mark_success(
        pool: &PgPool,
        run_id: Uuid,
        output_data: &serde_json::Value,
    ) -> Result<Option<ExecutionLog>, sqlx::Error> {
        let query = format!(
            "UPDATE execution_logs \
             SET status = 'success', output_data = $2, completed_at = NOW() \
             WHERE run_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExecutionLog>(&query)
            .bind(run_id)
            .bind(output_data)
            .fetch_optional(pool)
            .await
    }

    /// Transition an execution to 'failed' with an error message and
    /// stamp `completed_at`.
    pub async fn mark_failed(
        pool: &PgPool,
        run_id: Uuid,
        error_message: &str,
    ) -> Result<Option<ExecutionLog>, sqlx::Error> {
        let query = format!(
            "UPDATE execution_logs \
             SET status = 'failed', error_message = $2, completed_at = NOW() \
             WHERE run_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExecutionLog>(&query)
            .bind(run_id)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }
}
