pub mod dashboards;
pub mod executions;
pub mod health;
pub mod instances;
pub mod webhooks;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /instances                     list, create (connection-checked)
/// /instances/{id}                get, update, deactivate
///
/// /workflows                     list from an instance (?instance_id=)
/// /workflows/{id}                definition + parsed schemas (?instance_id=)
///
/// /dashboards                    list, create (with field definitions)
/// /dashboards/{id}               get, delete
/// /dashboards/{id}/execute       validate inputs + queue execution (POST)
///
/// /executions                    list (?status&workflow_id&instance_id&
///                                start_date&end_date&limit&offset),
///                                direct execute (POST)
/// /executions/{run_id}           get
/// /executions/{run_id}/render    classified output render plans (GET)
///
/// /webhooks/callback/{run_id}    workflow completion callback (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Connected workflow-automation instances.
        .nest("/instances", instances::router())
        // Workflow listing/detail proxied from an instance.
        .nest("/workflows", workflows::router())
        // Dashboards and their input forms.
        .nest("/dashboards", dashboards::router())
        // Execution history and direct execution.
        .nest("/executions", executions::router())
        // Completion callbacks from running workflows.
        .nest("/webhooks", webhooks::router())
}
