//! Workflow completion callbacks.
//!
//! A triggered workflow finishes by POSTing its output to the callback
//! URL it received in the trigger payload. The shared secret gates the
//! write; nothing here is otherwise authenticated.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use flowboard_core::execution::STATUS_SUCCESS;
use flowboard_n8n::CallbackOutcome;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Callback body posted by a finishing workflow.
#[derive(Debug, Deserialize)]
struct CallbackPayload {
    #[serde(default)]
    output_data: Option<Value>,
    secret_key: String,
}

/// Webhook routes mounted at `/webhooks`.
///
/// ```text
/// POST /callback/{run_id} -> handle_callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/callback/{run_id}", post(handle_callback))
}

/// POST /api/v1/webhooks/callback/{run_id}
///
/// Record a workflow's output and mark the run successful. Rejected with
/// 400 on a secret mismatch and 404 for an unknown run.
async fn handle_callback(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    Json(payload): Json<CallbackPayload>,
) -> AppResult<impl IntoResponse> {
    let output = payload
        .output_data
        .unwrap_or_else(|| Value::Object(Map::new()));

    match state
        .executor()
        .handle_callback(run_id, &output, &payload.secret_key)
        .await?
    {
        CallbackOutcome::Updated => Ok(Json(DataResponse {
            data: serde_json::json!({ "run_id": run_id, "status": STATUS_SUCCESS }),
        })),
        CallbackOutcome::BadSecret => Err(AppError::BadRequest(
            "Invalid callback secret".to_string(),
        )),
        CallbackOutcome::UnknownRun => {
            Err(AppError::NotFound(format!("Execution {run_id} not found")))
        }
    }
}
