//! Match event definitions and wire framing

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names emitted on tenant channels
pub const MATCH_CREATED_EVENT: &str = "opponent-match:created";
pub const PLAYER_JOINED_EVENT: &str = "opponent-match:player-joined";
pub const PLAYER_LEFT_EVENT: &str = "opponent-match:player-left";
pub const MATCH_CANCELLED_EVENT: &str = "opponent-match:cancelled";
pub const MATCH_COMPLETED_EVENT: &str = "opponent-match:completed";

/// Prefix of every tenant-scoped channel name
pub const TENANT_ROOM_PREFIX: &str = "tenant:";

/// Build the channel name for a tenant
pub fn tenant_room(tenant_id: &str) -> String {
    format!("{}{}", TENANT_ROOM_PREFIX, tenant_id)
}

/// Lifecycle transitions an opponent match can announce.
///
/// The broadcaster does not enforce transition order; it mirrors whatever the
/// booking API emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchEventKind {
    Created,
    PlayerJoined,
    PlayerLeft,
    Cancelled,
    Completed,
}

impl MatchEventKind {
    /// Wire name of the event as subscribers see it
    pub fn event_name(&self) -> &'static str {
        match self {
            MatchEventKind::Created => MATCH_CREATED_EVENT,
            MatchEventKind::PlayerJoined => PLAYER_JOINED_EVENT,
            MatchEventKind::PlayerLeft => PLAYER_LEFT_EVENT,
            MatchEventKind::Cancelled => MATCH_CANCELLED_EVENT,
            MatchEventKind::Completed => MATCH_COMPLETED_EVENT,
        }
    }

    /// All event kinds in lifecycle order
    pub fn all() -> [MatchEventKind; 5] {
        [
            MatchEventKind::Created,
            MatchEventKind::PlayerJoined,
            MatchEventKind::PlayerLeft,
            MatchEventKind::Cancelled,
            MatchEventKind::Completed,
        ]
    }
}

impl std::fmt::Display for MatchEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// The wire unit delivered to channel subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrame {
    pub event: String,
    pub payload: Value,
    pub emitted_at: chrono::DateTime<chrono::Utc>,
}

impl EventFrame {
    /// Create a new frame stamped with the current time
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
            emitted_at: chrono::Utc::now(),
        }
    }

    /// Serialize the frame to a JSON text frame
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            GatewayError::InternalError {
                message: format!("Failed to serialize event frame: {}", e),
            }
            .into()
        })
    }

    /// Deserialize a frame from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            GatewayError::InternalError {
                message: format!("Failed to deserialize event frame: {}", e),
            }
            .into()
        })
    }
}
