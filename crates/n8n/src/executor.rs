//! Asynchronous workflow execution lifecycle.
//!
//! Execution is fire-and-callback: the caller gets a `run_id` immediately,
//! a spawned task triggers the workflow's webhook with the validated
//! payload, and the workflow reports its result by POSTing back to
//! `{public_base_url}/api/v1/webhooks/callback/{run_id}`. Every state
//! transition lands in the `execution_logs` table.

use flowboard_db::models::execution::NewExecution;
use flowboard_db::models::instance::Instance;
use flowboard_db::repositories::ExecutionRepo;
use flowboard_db::DbPool;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::client::{N8nClient, N8nError};

/// Errors raised while queueing or running a workflow.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Client(#[from] N8nError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The workflow cannot be triggered remotely.
    #[error("Workflow has no webhook node")]
    NoWebhookNode,

    /// The webhook node exists but is not addressable.
    #[error("Webhook node has no path configured")]
    NoWebhookPath,
}

/// Result of processing a completion callback.
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The execution was marked successful.
    Updated,
    /// No execution row matches the run ID.
    UnknownRun,
    /// The shared secret did not match.
    BadSecret,
}

/// Queues workflow executions and records their lifecycle.
pub struct WorkflowExecutor {
    pool: DbPool,
    public_base_url: String,
    callback_secret: String,
}

impl WorkflowExecutor {
    /// Create an executor.
    ///
    /// * `public_base_url` - externally reachable base URL of this service,
    ///   used to build callback URLs handed to workflows.
    /// * `callback_secret` - shared secret workflows must echo back.
    pub fn new(pool: DbPool, public_base_url: String, callback_secret: String) -> Self {
        Self {
            pool,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            callback_secret,
        }
    }

    /// Queue a workflow execution and return its run ID immediately.
    ///
    /// Inserts a pending `execution_logs` row, then spawns the trigger
    /// task. Failures inside the task flip the row to failed; the caller
    /// only sees errors from client construction and the initial insert.
    pub async fn queue_execution(
        &self,
        instance: &Instance,
        workflow_id: &str,
        workflow_name: Option<&str>,
        input_data: Map<String, Value>,
        input_schema: Option<Value>,
        output_schema: Option<Value>,
    ) -> Result<Uuid, ExecuteError> {
        let client = N8nClient::new(&instance.url, &instance.api_key)?;
        let run_id = Uuid::new_v4();

        let new_execution = NewExecution {
            run_id,
            workflow_id: workflow_id.to_string(),
            workflow_name: workflow_name.map(str::to_string),
            instance_id: instance.id,
            input_data: Value::Object(input_data.clone()),
            input_schema,
            output_schema,
        };
        ExecutionRepo::create(&self.pool, &new_execution).await?;

        let callback_url = format!(
            "{}/api/v1/webhooks/callback/{run_id}",
            self.public_base_url
        );
        let pool = self.pool.clone();
        let workflow_id = workflow_id.to_string();

        tracing::info!(
            run_id = %run_id,
            workflow_id = %workflow_id,
            instance_id = instance.id,
            "Queued workflow execution",
        );

        tokio::spawn(async move {
            if let Err(e) =
                trigger_workflow(&pool, &client, run_id, &workflow_id, input_data, &callback_url)
                    .await
            {
                tracing::error!(run_id = %run_id, error = %e, "Workflow execution failed");
                if let Err(db_err) = ExecutionRepo::mark_failed(&pool, run_id, &e.to_string()).await
                {
                    tracing::error!(
                        run_id = %run_id,
                        error = %db_err,
                        "Failed to record execution failure",
                    );
                }
            }
        });

        Ok(run_id)
    }

    /// Record a workflow completion callback.
    ///
    /// The secret must match before anything is written. An unknown run ID
    /// is reported, not an error; workflows sometimes retry callbacks for
    /// runs that were already purged.
    pub async fn handle_callback(
        &self,
        run_id: Uuid,
        output_data: &Value,
        secret_key: &str,
    ) -> Result<CallbackOutcome, sqlx::Error> {
        if self.callback_secret.is_empty() || secret_key != self.callback_secret {
            tracing::warn!(run_id = %run_id, "Rejected callback with invalid secret");
            return Ok(CallbackOutcome::BadSecret);
        }

        match ExecutionRepo::mark_success(&self.pool, run_id, output_data).await? {
            Some(_) => {
                tracing::info!(run_id = %run_id, "Execution completed");
                Ok(CallbackOutcome::Updated)
            }
            None => {
                tracing::warn!(run_id = %run_id, "Callback for unknown run");
                Ok(CallbackOutcome::UnknownRun)
            }
        }
    }
}

/// Body of the spawned trigger task.
///
/// Marks the row running, locates the workflow's webhook endpoint, and
/// POSTs the payload plus the callback coordinates. Any error propagates
/// to the spawn wrapper, which marks the row failed.
async fn trigger_workflow(
    pool: &DbPool,
    client: &N8nClient,
    run_id: Uuid,
    workflow_id: &str,
    input_data: Map<String, Value>,
    callback_url: &str,
) -> Result<(), ExecuteError> {
    ExecutionRepo::mark_running(pool, run_id).await?;

    let workflow = client.get_workflow(workflow_id).await?;
    let (path, method) = webhook_endpoint(&workflow)?;

    let mut payload = input_data;
    payload.insert(
        "_callback_url".to_string(),
        Value::String(callback_url.to_string()),
    );
    payload.insert("_run_id".to_string(), Value::String(run_id.to_string()));

    client
        .trigger_webhook(&method, &path, &Value::Object(payload))
        .await?;

    tracing::info!(run_id = %run_id, "Workflow webhook triggered");
    Ok(())
}

/// Find the webhook node's path and HTTP method in a workflow definition.
fn webhook_endpoint(workflow: &Value) -> Result<(String, String), ExecuteError> {
    let empty = Vec::new();
    let nodes = workflow
        .get("nodes")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let node = nodes
        .iter()
        .find(|node| {
            node.get("type")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_ascii_lowercase()
                .contains("webhook")
        })
        .ok_or(ExecuteError::NoWebhookNode)?;

    let params = node.get("parameters");
    let path = params
        .and_then(|p| p.get("path"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if path.is_empty() {
        return Err(ExecuteError::NoWebhookPath);
    }
    let method = params
        .and_then(|p| p.get("httpMethod"))
        .and_then(Value::as_str)
        .unwrap_or("POST");

    Ok((path.to_string(), method.to_string()))
}
