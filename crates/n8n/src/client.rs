//! REST client for a single workflow-automation instance.
//!
//! Wraps the instance HTTP API (workflow listing, definition retrieval,
//! connection validation, webhook triggering) using [`reqwest`]. Requests
//! retry with exponential backoff plus jitter before giving up.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attempts per request before reporting a connection failure.
const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles after each failure.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Timeout for ordinary API requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for webhook triggers, which block until the workflow's
/// first response.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(900);

/// Errors from the instance REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum N8nError {
    /// The configured instance URL is not an absolute http(s) URL.
    #[error("Invalid instance URL: {0}")]
    InvalidUrl(String),

    /// The API key is empty or not representable as a header value.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// The request could not reach the instance, even after retries.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The instance rejected the API key.
    #[error("Unauthorized: invalid API key for instance {0}")]
    Unauthorized(String),

    /// The requested resource does not exist on the instance.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The instance returned a non-2xx status code.
    #[error("Instance API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// One entry in the instance's workflow listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// HTTP client for a single workflow-automation instance.
///
/// Holds the sanitized base URL and a [`reqwest::Client`] carrying the
/// `X-N8N-API-KEY` header on every request.
#[derive(Debug)]
pub struct N8nClient {
    client: reqwest::Client,
    base_url: String,
}

impl N8nClient {
    /// Create a client for an instance.
    ///
    /// Validates the URL, collapses pasted page URLs (`.../workflow/<id>`,
    /// `.../home/workflows`) back to the instance origin, and installs the
    /// API-key header.
    pub fn new(instance_url: &str, api_key: &str) -> Result<Self, N8nError> {
        if api_key.is_empty() {
            return Err(N8nError::InvalidApiKey("cannot be empty".to_string()));
        }
        let base_url = sanitize_base_url(instance_url)?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            N8nError::InvalidApiKey("contains characters not allowed in a header".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-N8N-API-KEY", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| N8nError::Connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Sanitized instance origin, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the workflow listing.
    ///
    /// Tolerates both the `{"data": [...]}` envelope and a bare array;
    /// instances differ across versions.
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, N8nError> {
        let response = self.request(Method::GET, "api/v1/workflows").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| N8nError::Connection(format!("Invalid response from instance: {e}")))?;

        let raw: &[Value] = if let Some(data) = body.get("data").and_then(Value::as_array) {
            data
        } else if let Some(items) = body.as_array() {
            items
        } else {
            return Err(N8nError::Connection(
                "Unexpected workflow list shape from instance".to_string(),
            ));
        };

        Ok(raw.iter().map(summary_from_value).collect())
    }

    /// Fetch a full workflow definition by ID.
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value, N8nError> {
        let response = self
            .request(Method::GET, &format!("api/v1/workflows/{workflow_id}"))
            .await?;
        response
            .json()
            .await
            .map_err(|e| N8nError::Connection(format!("Invalid workflow response: {e}")))
    }

    /// Check that the instance is reachable and the API key is accepted.
    pub async fn validate_connection(&self) -> bool {
        self.request(Method::GET, "api/v1/workflows?limit=1")
            .await
            .is_ok()
    }

    /// Trigger a workflow's webhook endpoint with a JSON payload.
    ///
    /// Unknown method names fall back to POST, the instance's default for
    /// webhook nodes. Uses the long webhook timeout instead of retries:
    /// a webhook trigger is not safely repeatable.
    pub async fn trigger_webhook(
        &self,
        method: &str,
        path: &str,
        payload: &Value,
    ) -> Result<(), N8nError> {
        let url = format!("{}/webhook/{}", self.base_url, path);
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::POST);

        tracing::info!(url = %url, "Triggering workflow webhook");
        let response = self
            .client
            .request(method, &url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(payload)
            .send()
            .await
            .map_err(|e| N8nError::Connection(format!("Webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(N8nError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    // ---- private helpers ----

    /// Issue a request with retry. 401 and 404 responses are terminal;
    /// network errors and other non-2xx statuses retry with backoff.
    async fn request(
        &self,
        method: Method,
        path_and_query: &str,
    ) -> Result<reqwest::Response, N8nError> {
        let url = format!("{}/{}", self.base_url, path_and_query);
        let mut last_error = N8nError::Connection("no attempt made".to_string());

        for attempt in 0..MAX_ATTEMPTS {
            match self.client.request(method.clone(), &url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED {
                        return Err(N8nError::Unauthorized(self.base_url.clone()));
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(N8nError::NotFound(url));
                    }
                    if status.is_success() {
                        return Ok(response);
                    }
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<unreadable body>".to_string());
                    last_error = N8nError::Api {
                        status: status.as_u16(),
                        body,
                    };
                }
                Err(e) => last_error = N8nError::Connection(e.to_string()),
            }

            if attempt + 1 < MAX_ATTEMPTS {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    url = %url,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Instance request failed, retrying",
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(N8nError::Connection(format!(
            "Failed to reach instance after {MAX_ATTEMPTS} attempts: {last_error}"
        )))
    }
}

/// Exponential backoff with up to one second of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = BASE_DELAY * 2u32.pow(attempt);
    let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
    base + jitter
}

/// Validate an instance URL and reduce it to a usable API base.
///
/// Users paste browser URLs like `https://host/workflow/abc123` or
/// `https://host/home/workflows`; those collapse to the origin. Anything
/// else keeps its path, minus a trailing slash.
fn sanitize_base_url(instance_url: &str) -> Result<String, N8nError> {
    let trimmed = instance_url.trim();
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(N8nError::InvalidUrl(trimmed.to_string()));
    };
    if scheme != "http" && scheme != "https" {
        return Err(N8nError::InvalidUrl(trimmed.to_string()));
    }
    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err(N8nError::InvalidUrl(trimmed.to_string()));
    }

    if trimmed.contains("/workflow/") || trimmed.contains("/home/") {
        let origin = format!("{scheme}://{host}");
        tracing::warn!(url = trimmed, origin = %origin, "Collapsed pasted page URL to instance origin");
        return Ok(origin);
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn summary_from_value(value: &Value) -> WorkflowSummary {
    WorkflowSummary {
        id: value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        active: value.get("active").and_then(Value::as_bool).unwrap_or(false),
    }
}
