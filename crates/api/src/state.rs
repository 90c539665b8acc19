use std::sync::Arc;

use flowboard_n8n::WorkflowExecutor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: flowboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Workflow executor wired to this state's pool and callback settings.
    pub fn executor(&self) -> WorkflowExecutor {
        WorkflowExecutor::new(
            self.pool.clone(),
            self.config.public_base_url.clone(),
            self.config.callback_secret.clone(),
        )
    }
}
