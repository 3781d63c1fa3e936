//! Configuration management for the courtside service
//!
//! This module handles all configuration loading from environment variables,
//! validation, and default values for the notification service. The payment
//! integration namespace is resolved once at startup and never fails.

pub mod app;
pub mod payment;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, GatewaySettings, ServiceSettings};
pub use payment::{PaymentConfig, PAYMENT_CONFIG_NAMESPACE};
