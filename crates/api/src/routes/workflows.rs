//! Routes proxying workflow data from a connected instance.
//!
//! Workflows live on the external instance, not in the local database;
//! these endpoints fetch on demand and enrich the detail view with the
//! parsed input/output field lists and trigger type.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use flowboard_core::error::CoreError;
use flowboard_core::types::DbId;
use flowboard_db::repositories::InstanceRepo;
use flowboard_n8n::{detect_trigger_type, parse_input_schema, parse_output_schema, N8nClient};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameter selecting which instance to talk to.
#[derive(Debug, Deserialize)]
struct InstanceScope {
    instance_id: DbId,
}

/// Workflow routes mounted at `/workflows`.
///
/// ```text
/// GET /      -> list_workflows (?instance_id=)
/// GET /{id}  -> get_workflow   (?instance_id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workflows))
        .route("/{id}", get(get_workflow))
}

/// Build a client for the scoped instance, 404 if it does not exist.
async fn client_for(state: &AppState, instance_id: DbId) -> AppResult<N8nClient> {
    let instance = InstanceRepo::find_by_id(&state.pool, instance_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id: instance_id,
        }))?;

    Ok(N8nClient::new(&instance.url, &instance.api_key)?)
}

/// GET /api/v1/workflows?instance_id=
///
/// List the instance's workflows (id, name, active).
async fn list_workflows(
    State(state): State<AppState>,
    Query(scope): Query<InstanceScope>,
) -> AppResult<impl IntoResponse> {
    let client = client_for(&state, scope.instance_id).await?;
    let workflows = client.list_workflows().await?;

    Ok(Json(DataResponse { data: workflows }))
}

/// GET /api/v1/workflows/{id}?instance_id=
///
/// Full workflow definition plus the parsed input/output field lists and
/// detected trigger type.
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(scope): Query<InstanceScope>,
) -> AppResult<impl IntoResponse> {
    let client = client_for(&state, scope.instance_id).await?;
    let workflow = client.get_workflow(&id).await?;

    let input_schema = parse_input_schema(&workflow);
    let output_schema = parse_output_schema(&workflow);
    let trigger_type = detect_trigger_type(&workflow);

    let detail = serde_json::json!({
        "workflow": workflow,
        "input_schema": input_schema,
        "output_schema": output_schema,
        "trigger_type": trigger_type,
    });

    Ok(Json(DataResponse { data: detail }))
}
