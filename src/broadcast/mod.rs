//! Tenant-scoped event broadcasting
//!
//! This module owns the publish/subscribe core of the notification service:
//! channel naming, wire framing, the per-tenant channel registry, and the
//! broadcaster façade the rest of the platform calls.

pub mod events;
pub mod publisher;
pub mod registry;

// Re-export commonly used types
pub use events::{tenant_room, EventFrame, MatchEventKind};
pub use publisher::{MatchEventBroadcaster, MockEventBroadcaster, TenantChannelBroadcaster};
pub use registry::{RegistryStats, TenantChannelRegistry};
