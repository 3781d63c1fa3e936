//! Error types for the notification service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific gateway scenarios
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid tenant identifier: {reason}")]
    InvalidTenant { reason: String },

    #[error("Channel registry failure: {message}")]
    ChannelRegistryFailed { message: String },

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Invalid user context: {reason}")]
    InvalidUserContext { reason: String },

    #[error("Facility not found: {facility_id}")]
    FacilityNotFound { facility_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
