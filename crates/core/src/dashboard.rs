//! Dashboard and instance authoring validation helpers.
//!
//! Structural checks applied when dashboards and workflow instances are
//! created or updated, before anything touches the database.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
   Validation limits
   -------------------------------------------------------------------------- */

/// Maximum length for a dashboard name.
pub const MAX_DASHBOARD_NAME_LEN: usize = 200;

/// Maximum length for a dashboard description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum length for an instance name.
pub const MAX_INSTANCE_NAME_LEN: usize = 200;

/* --------------------------------------------------------------------------
   Validation functions
   -------------------------------------------------------------------------- */

/// Validate a dashboard name: non-empty after trimming, within length.
pub fn validate_dashboard_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Dashboard name cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_DASHBOARD_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Dashboard name cannot exceed {MAX_DASHBOARD_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional dashboard description's length.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.len() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Validate an instance name: non-empty after trimming, within length.
pub fn validate_instance_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Instance name cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_INSTANCE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Instance name cannot exceed {MAX_INSTANCE_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an instance base URL: must be absolute http(s).
pub fn validate_instance_url(url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CoreError::Validation(format!(
            "Instance URL must start with http:// or https:// (got '{trimmed}')"
        )));
    }
    let after_scheme = trimmed.split("://").nth(1).unwrap_or("");
    if after_scheme.is_empty() || after_scheme.starts_with('/') {
        return Err(CoreError::Validation(format!(
            "Instance URL has no host: '{trimmed}'"
        )));
    }
    Ok(())
}
