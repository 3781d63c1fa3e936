//! Courtside - Real-time notification service for facility bookings
//!
//! This crate provides tenant-scoped match-event broadcasting over websocket
//! channels, payment integration settings, and role-gated admin surfaces for
//! a multi-tenant sports-facility booking platform.

pub mod auth;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod facility;
pub mod gateway;
pub mod metrics;
pub mod service;
pub mod types;
pub mod utils;
pub mod waitlist;

// Re-export commonly used types and traits
pub use error::{GatewayError, Result};
pub use types::*;

// Re-export key components
pub use broadcast::publisher::MatchEventBroadcaster;
pub use broadcast::registry::TenantChannelRegistry;
pub use facility::{FacilityDirectory, StaticFacilityDirectory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
