//! Routes for execution history and direct execution.
//!
//! All routes are mounted under `/executions`. History rows are keyed
//! externally by `run_id`; the render endpoint turns an execution's
//! output into classified render plans for the result view.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use flowboard_core::error::CoreError;
use flowboard_core::execution::{is_valid_status, STATUS_PENDING};
use flowboard_core::render::{classify, RenderPlan};
use flowboard_core::schema::{compile, FieldSchema, ValidationResult};
use flowboard_core::types::DbId;
use flowboard_db::models::execution::ExecutionFilter;
use flowboard_db::repositories::{ExecutionRepo, InstanceRepo};
use flowboard_n8n::{parse_input_schema, parse_output_schema, N8nClient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for direct execution without a dashboard.
#[derive(Debug, Deserialize)]
struct ExecuteWorkflow {
    instance_id: DbId,
    workflow_id: String,
    #[serde(default)]
    inputs: Map<String, Value>,
}

/// Rendered view of one output field.
#[derive(Debug, Serialize)]
struct RenderedField {
    key: String,
    label: String,
    plan: RenderPlan,
}

/// Execution routes mounted at `/executions`.
///
/// ```text
/// GET  /                  -> list_executions (filters + pagination)
/// POST /                  -> execute_workflow (direct, no dashboard)
/// GET  /{run_id}          -> get_execution
/// GET  /{run_id}/render   -> render_execution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_executions).post(execute_workflow))
        .route("/{run_id}", get(get_execution))
        .route("/{run_id}/render", get(render_execution))
}

/// GET /api/v1/executions
///
/// List executions, newest first, with optional status / workflow /
/// instance / date-range filters.
async fn list_executions(
    State(state): State<AppState>,
    Query(filter): Query<ExecutionFilter>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref status) = filter.status {
        if !is_valid_status(status) {
            return Err(AppError::BadRequest(format!(
                "Unknown execution status '{status}'"
            )));
        }
    }

    let executions = ExecutionRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: executions }))
}

/// POST /api/v1/executions
///
/// Execute a workflow directly, without a dashboard. When the workflow
/// declares an input schema, the inputs are validated against it exactly
/// as a dashboard form would be; a workflow without one takes the inputs
/// as given.
async fn execute_workflow(
    State(state): State<AppState>,
    Json(input): Json<ExecuteWorkflow>,
) -> AppResult<impl IntoResponse> {
    let instance = InstanceRepo::find_by_id(&state.pool, input.instance_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id: input.instance_id,
        }))?;

    let client = N8nClient::new(&instance.url, &instance.api_key)?;
    let workflow = client.get_workflow(&input.workflow_id).await?;
    let workflow_name = workflow
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    let schemas = parse_input_schema(&workflow);
    let values = if schemas.is_empty() {
        input.inputs
    } else {
        let form = compile(&schemas)?;
        match flowboard_core::schema::validate(&form, &input.inputs) {
            ValidationResult::Valid(values) => values,
            ValidationResult::Invalid(errors) => return Err(AppError::InvalidInput(errors)),
        }
    };

    let output_schemas = parse_output_schema(&workflow);
    let input_schema = (!schemas.is_empty())
        .then(|| serde_json::to_value(&schemas).ok())
        .flatten();
    let output_schema = (!output_schemas.is_empty())
        .then(|| serde_json::to_value(&output_schemas).ok())
        .flatten();

    let run_id = state
        .executor()
        .queue_execution(
            &instance,
            &input.workflow_id,
            workflow_name.as_deref(),
            values,
            input_schema,
            output_schema,
        )
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: serde_json::json!({ "run_id": run_id, "status": STATUS_PENDING }),
        }),
    ))
}

/// GET /api/v1/executions/{run_id}
async fn get_execution(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let execution = ExecutionRepo::find_by_run_id(&state.pool, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Execution {run_id} not found")))?;

    Ok(Json(DataResponse { data: execution }))
}

/// GET /api/v1/executions/{run_id}/render
///
/// Classify the execution's output into render plans. Output-schema hints
/// stored at queue time pick explicit kinds (email, date, file, ...);
/// everything else is inferred from value shape. A run with no output yet
/// returns an empty field list.
async fn render_execution(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let execution = ExecutionRepo::find_by_run_id(&state.pool, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Execution {run_id} not found")))?;

    let hints: Vec<FieldSchema> = execution
        .output_schema
        .clone()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let fields = match &execution.output_data {
        None => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| {
                let hint = hints.iter().find(|h| h.key == *key);
                RenderedField {
                    key: key.clone(),
                    label: hint
                        .map(|h| h.label.clone())
                        .unwrap_or_else(|| key.clone()),
                    plan: classify(value, hint),
                }
            })
            .collect(),
        // Schema-less scalar or array output renders as a single field.
        Some(other) => vec![RenderedField {
            key: "output".to_string(),
            label: "Output".to_string(),
            plan: classify(other, None),
        }],
    };

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "run_id": execution.run_id,
            "status": execution.status,
            "fields": fields,
        }),
    }))
}
