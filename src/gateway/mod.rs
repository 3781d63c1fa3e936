//! WebSocket gateway for tenant-scoped event delivery
//!
//! The gateway exposes three surfaces: the per-tenant WebSocket stream the
//! booking front end subscribes to, the internal ingress endpoint the booking
//! API posts match transitions to, and the facility listing for super admins.

pub mod routes;
pub mod server;
pub mod socket;

pub use routes::{FacilityView, PublishMatchEventRequest};
pub use server::{GatewayServer, GatewayServerConfig, GatewayState};
