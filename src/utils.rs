//! Utility functions for the notification service

use crate::error::GatewayError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Longest tenant identifier accepted by the gateway
pub const MAX_TENANT_ID_LENGTH: usize = 128;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique facility ID
pub fn generate_facility_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Check that a caller-supplied tenant identifier has a usable shape.
///
/// Tenant ids become part of channel names, so they must be non-empty,
/// bounded in length, and free of whitespace and control characters.
pub fn validate_tenant_id(tenant_id: &str) -> Result<(), GatewayError> {
    if tenant_id.is_empty() {
        return Err(GatewayError::InvalidTenant {
            reason: "tenant id is empty".to_string(),
        });
    }

    if tenant_id.len() > MAX_TENANT_ID_LENGTH {
        return Err(GatewayError::InvalidTenant {
            reason: format!(
                "tenant id exceeds {} characters",
                MAX_TENANT_ID_LENGTH
            ),
        });
    }

    if tenant_id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(GatewayError::InvalidTenant {
            reason: "tenant id contains whitespace or control characters".to_string(),
        });
    }

    Ok(())
}

/// Format an uptime duration as a compact human-readable string
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
