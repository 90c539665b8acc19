//! Client and execution plumbing for n8n-style workflow-automation
//! instances.
//!
//! [`client::N8nClient`] wraps the instance REST API (workflow listing,
//! definition fetch, connection validation, webhook triggering) with
//! retry/backoff. [`schema`] extracts form field definitions from raw
//! workflow JSON. [`executor::WorkflowExecutor`] runs the asynchronous
//! execute-then-callback lifecycle against the execution log.

pub mod client;
pub mod executor;
pub mod schema;

pub use client::{N8nClient, N8nError, WorkflowSummary};
pub use executor::{CallbackOutcome, ExecuteError, WorkflowExecutor};
pub use schema::{detect_trigger_type, parse_input_schema, parse_output_schema, TriggerType};
