//! Execution lifecycle constants.

/// Queued, not yet delivered to the workflow instance.
pub const STATUS_PENDING: &str = "pending";

/// Delivered to the workflow instance, awaiting its callback.
pub const STATUS_RUNNING: &str = "running";

/// Callback received with output data.
pub const STATUS_SUCCESS: &str = "success";

/// Trigger or execution failed; `error_message` carries the reason.
pub const STATUS_FAILED: &str = "failed";

/// All valid execution statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_RUNNING,
    STATUS_SUCCESS,
    STATUS_FAILED,
];

/// Check whether a status filter value is recognized.
pub fn is_valid_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}
