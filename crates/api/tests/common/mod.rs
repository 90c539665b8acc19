#![allow(dead_code)]

//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the application through [`build_app_router`] so tests exercise
//! the same middleware stack (CORS, request ID, timeout, tracing, panic
//! recovery) that production uses, and provides request/seeding helpers
//! around `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use flowboard_api::config::ServerConfig;
use flowboard_api::router::build_app_router;
use flowboard_api::state::AppState;

/// Shared secret used by the webhook callback tests.
pub const TEST_CALLBACK_SECRET: &str = "test-callback-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        callback_secret: TEST_CALLBACK_SECRET.to_string(),
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds"),
    )
    .await
    .expect("request succeeds")
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

/// Send a PUT request with a JSON body.
pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds"),
    )
    .await
    .expect("request succeeds")
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds"),
    )
    .await
    .expect("request succeeds")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Insert an instance row directly, bypassing the live connection check.
/// The URL points at a discard port so nothing ever answers.
pub async fn seed_instance(pool: &PgPool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO instances (name, url, api_key) \
         VALUES ('Test instance', 'http://127.0.0.1:9', 'test-api-key') \
         RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("instance seeds")
}

/// Insert an execution row directly with the given status and output.
pub async fn seed_execution(
    pool: &PgPool,
    instance_id: i64,
    status: &str,
    output_data: Option<serde_json::Value>,
    output_schema: Option<serde_json::Value>,
) -> Uuid {
    let run_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO execution_logs \
            (run_id, workflow_id, workflow_name, instance_id, status, \
             input_data, output_data, output_schema) \
         VALUES ($1, 'wf-test', 'Test workflow', $2, $3, '{}'::jsonb, $4, $5)",
    )
    .bind(run_id)
    .bind(instance_id)
    .bind(status)
    .bind(output_data)
    .bind(output_schema)
    .execute(pool)
    .await
    .expect("execution seeds");
    run_id
}
