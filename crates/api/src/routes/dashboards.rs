//! Routes for dashboards and their input forms.
//!
//! All routes are mounted under `/dashboards`. A dashboard binds a
//! workflow on one instance to an ordered set of field definitions; the
//! execute endpoint compiles those fields into a form, validates the
//! submitted values, and queues the workflow with the coerced payload.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use flowboard_core::dashboard::{validate_dashboard_name, validate_description};
use flowboard_core::error::CoreError;
use flowboard_core::execution::STATUS_PENDING;
use flowboard_core::schema::{compile, FieldSchema, ValidationResult};
use flowboard_core::types::DbId;
use flowboard_db::models::dashboard::{CreateDashboard, ExecuteDashboard};
use flowboard_db::repositories::{DashboardRepo, InstanceRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboards`.
///
/// ```text
/// GET    /              -> list_dashboards
/// POST   /              -> create_dashboard
/// GET    /{id}          -> get_dashboard (with fields)
/// DELETE /{id}          -> delete_dashboard
/// POST   /{id}/execute  -> execute_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dashboards).post(create_dashboard))
        .route("/{id}", get(get_dashboard).delete(delete_dashboard))
        .route("/{id}/execute", post(execute_dashboard))
}

/// GET /api/v1/dashboards
async fn list_dashboards(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dashboards = DashboardRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: dashboards }))
}

/// POST /api/v1/dashboards
///
/// Create a dashboard with its field definitions. The fields are compiled
/// up front so duplicate keys and unknown kinds are rejected before
/// anything is stored.
async fn create_dashboard(
    State(state): State<AppState>,
    Json(input): Json<CreateDashboard>,
) -> AppResult<impl IntoResponse> {
    validate_dashboard_name(&input.name)?;
    validate_description(input.description.as_deref())?;

    InstanceRepo::find_by_id(&state.pool, input.instance_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id: input.instance_id,
        }))?;

    let schemas: Vec<FieldSchema> = input.fields.iter().map(|f| f.to_field_schema()).collect();
    compile(&schemas)?;

    let dashboard = DashboardRepo::create(&state.pool, &input).await?;

    tracing::info!(
        dashboard_id = dashboard.dashboard.id,
        name = %dashboard.dashboard.name,
        field_count = dashboard.fields.len(),
        "Dashboard created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: dashboard })))
}

/// GET /api/v1/dashboards/{id}
///
/// Dashboard metadata plus its ordered field definitions.
async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let dashboard = DashboardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dashboard",
            id,
        }))?;

    Ok(Json(DataResponse { data: dashboard }))
}

/// DELETE /api/v1/dashboards/{id}
async fn delete_dashboard(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !DashboardRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Dashboard",
            id,
        }));
    }

    tracing::info!(dashboard_id = id, "Dashboard deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/dashboards/{id}/execute
///
/// Validate the submitted inputs against the dashboard's compiled form,
/// then queue the workflow. A failed validation returns 422 with the full
/// per-field error list; success returns 202 with the run ID.
async fn execute_dashboard(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ExecuteDashboard>,
) -> AppResult<impl IntoResponse> {
    let dashboard = DashboardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dashboard",
            id,
        }))?;

    let instance_id = dashboard.dashboard.instance_id;
    let instance = InstanceRepo::find_by_id(&state.pool, instance_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id: instance_id,
        }))?;

    let schemas: Vec<FieldSchema> = dashboard.fields.iter().map(|f| f.to_field_schema()).collect();
    let form = compile(&schemas)?;

    let values = match flowboard_core::schema::validate(&form, &input.inputs) {
        ValidationResult::Valid(values) => values,
        ValidationResult::Invalid(errors) => return Err(AppError::InvalidInput(errors)),
    };

    let input_schema = serde_json::to_value(&schemas).ok();
    let run_id = state
        .executor()
        .queue_execution(
            &instance,
            &dashboard.dashboard.workflow_id,
            Some(&dashboard.dashboard.name),
            values,
            input_schema,
            None,
        )
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: serde_json::json!({ "run_id": run_id, "status": STATUS_PENDING }),
        }),
    ))
}
