//! HTTP-level integration tests for the workflow completion callback.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, seed_execution, seed_instance, TEST_CALLBACK_SECRET};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: a wrong secret is rejected and nothing is written
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn callback_with_wrong_secret_returns_400(pool: PgPool) {
    let instance_id = seed_instance(&pool).await;
    let run_id = seed_execution(&pool, instance_id, "running", None, None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/webhooks/callback/{run_id}"),
        json!({
            "secret_key": "wrong",
            "output_data": { "result": "should not land" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let status: String =
        sqlx::query_scalar("SELECT status FROM execution_logs WHERE run_id = $1")
            .bind(run_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "running");
}

// ---------------------------------------------------------------------------
// Test: the correct secret for an unknown run returns 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn callback_for_unknown_run_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/webhooks/callback/00000000-0000-0000-0000-000000000000",
        json!({ "secret_key": TEST_CALLBACK_SECRET }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: a valid callback stores the output and completes the run
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn callback_marks_run_successful(pool: PgPool) {
    let instance_id = seed_instance(&pool).await;
    let run_id = seed_execution(&pool, instance_id, "running", None, None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/webhooks/callback/{run_id}"),
        json!({
            "secret_key": TEST_CALLBACK_SECRET,
            "output_data": { "result": "done", "count": 3 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["run_id"], run_id.to_string());
    assert_eq!(json["data"]["status"], "success");

    // The execution now reads back as completed with its output.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/executions/{run_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "success");
    assert_eq!(json["data"]["output_data"]["result"], "done");
    assert_eq!(json["data"]["output_data"]["count"], 3);
    assert!(json["data"]["completed_at"].is_string());
}

// ---------------------------------------------------------------------------
// Test: a callback without output data completes with an empty object
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn callback_without_output_stores_empty_object(pool: PgPool) {
    let instance_id = seed_instance(&pool).await;
    let run_id = seed_execution(&pool, instance_id, "running", None, None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/webhooks/callback/{run_id}"),
        json!({ "secret_key": TEST_CALLBACK_SECRET }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let output: serde_json::Value =
        sqlx::query_scalar("SELECT output_data FROM execution_logs WHERE run_id = $1")
            .bind(run_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(output, json!({}));
}
