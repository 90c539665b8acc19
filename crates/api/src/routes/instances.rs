//! Routes for connected workflow-automation instances.
//!
//! All routes are mounted under `/instances`. Creating or repointing an
//! instance checks the connection against the live server first; deletion
//! is a soft deactivation so execution history keeps its foreign keys.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use flowboard_core::dashboard::{validate_instance_name, validate_instance_url};
use flowboard_core::error::CoreError;
use flowboard_core::types::DbId;
use flowboard_db::models::instance::{CreateInstance, UpdateInstance};
use flowboard_db::repositories::InstanceRepo;
use flowboard_n8n::N8nClient;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Instance routes mounted at `/instances`.
///
/// ```text
/// GET    /      -> list_instances
/// POST   /      -> create_instance
/// GET    /{id}  -> get_instance
/// PUT    /{id}  -> update_instance
/// DELETE /{id}  -> delete_instance (deactivate)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instances).post(create_instance))
        .route(
            "/{id}",
            get(get_instance)
                .put(update_instance)
                .delete(delete_instance),
        )
}

/// GET /api/v1/instances
///
/// List active instances. API keys never serialize into the response.
async fn list_instances(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let instances = InstanceRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: instances }))
}

/// POST /api/v1/instances
///
/// Connect a new instance. The URL and API key are checked against the
/// live server before anything is stored.
async fn create_instance(
    State(state): State<AppState>,
    Json(input): Json<CreateInstance>,
) -> AppResult<impl IntoResponse> {
    validate_instance_name(&input.name)?;
    validate_instance_url(&input.url)?;

    let client = N8nClient::new(&input.url, &input.api_key)?;
    if !client.validate_connection().await {
        return Err(AppError::BadRequest(
            "Could not connect to the instance with the given URL and API key".to_string(),
        ));
    }

    let instance = InstanceRepo::create(&state.pool, &input).await?;

    tracing::info!(instance_id = instance.id, name = %instance.name, "Instance connected");

    Ok((StatusCode::CREATED, Json(DataResponse { data: instance })))
}

/// GET /api/v1/instances/{id}
async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let instance = InstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id,
        }))?;

    Ok(Json(DataResponse { data: instance }))
}

/// PUT /api/v1/instances/{id}
///
/// Update connection settings. Changing the URL or API key re-checks the
/// connection with the effective combination.
async fn update_instance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInstance>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref name) = input.name {
        validate_instance_name(name)?;
    }
    if let Some(ref url) = input.url {
        validate_instance_url(url)?;
    }

    let existing = InstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id,
        }))?;

    if input.url.is_some() || input.api_key.is_some() {
        let url = input.url.as_deref().unwrap_or(&existing.url);
        let api_key = input.api_key.as_deref().unwrap_or(&existing.api_key);
        let client = N8nClient::new(url, api_key)?;
        if !client.validate_connection().await {
            return Err(AppError::BadRequest(
                "Could not connect to the instance with the updated URL and API key".to_string(),
            ));
        }
    }

    let instance = InstanceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id,
        }))?;

    tracing::info!(instance_id = id, "Instance updated");

    Ok(Json(DataResponse { data: instance }))
}

/// DELETE /api/v1/instances/{id}
///
/// Soft delete: the instance is deactivated, not removed.
async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !InstanceRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Instance",
            id,
        }));
    }

    tracing::info!(instance_id = id, "Instance deactivated");

    Ok(StatusCode::NO_CONTENT)
}
