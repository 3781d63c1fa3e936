//! Match event broadcasting to tenant channels

use crate::broadcast::events::{tenant_room, EventFrame, MatchEventKind};
use crate::broadcast::registry::TenantChannelRegistry;
use crate::types::OpponentMatch;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for broadcasting opponent-match events.
///
/// `broadcast` is the single delivery primitive; the five typed emitters
/// address the tenant channel, name the event, and delegate to it. Emissions
/// are fire-and-forget: nothing is returned to the caller and failures are
/// absorbed after logging. Delivery is at-most-once with no replay; ordering
/// holds per channel for one caller's sequential emissions.
#[async_trait]
pub trait MatchEventBroadcaster: Send + Sync {
    /// Deliver an event to every subscriber of a channel.
    ///
    /// Returns the number of subscribers reached, for observability only.
    async fn broadcast(&self, channel: &str, event: &str, payload: Value) -> usize;

    /// Emit a typed opponent-match event to the tenant's channel
    async fn emit_match_event(
        &self,
        kind: MatchEventKind,
        tenant_id: &str,
        match_payload: &OpponentMatch,
    ) {
        let payload = match serde_json::to_value(match_payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "Dropping {} for tenant {}: payload serialization failed: {}",
                    kind.event_name(),
                    tenant_id,
                    e
                );
                return;
            }
        };

        let delivered = self
            .broadcast(&tenant_room(tenant_id), kind.event_name(), payload)
            .await;
        debug!(
            "Emitted {} for tenant {} to {} subscriber(s)",
            kind.event_name(),
            tenant_id,
            delivered
        );
    }

    /// Emit `opponent-match:created`
    async fn emit_match_created(&self, tenant_id: &str, match_payload: &OpponentMatch) {
        self.emit_match_event(MatchEventKind::Created, tenant_id, match_payload)
            .await;
    }

    /// Emit `opponent-match:player-joined`
    async fn emit_player_joined(&self, tenant_id: &str, match_payload: &OpponentMatch) {
        self.emit_match_event(MatchEventKind::PlayerJoined, tenant_id, match_payload)
            .await;
    }

    /// Emit `opponent-match:player-left`
    async fn emit_player_left(&self, tenant_id: &str, match_payload: &OpponentMatch) {
        self.emit_match_event(MatchEventKind::PlayerLeft, tenant_id, match_payload)
            .await;
    }

    /// Emit `opponent-match:cancelled`
    async fn emit_match_cancelled(&self, tenant_id: &str, match_payload: &OpponentMatch) {
        self.emit_match_event(MatchEventKind::Cancelled, tenant_id, match_payload)
            .await;
    }

    /// Emit `opponent-match:completed`
    async fn emit_match_completed(&self, tenant_id: &str, match_payload: &OpponentMatch) {
        self.emit_match_event(MatchEventKind::Completed, tenant_id, match_payload)
            .await;
    }
}

/// Broadcaster implementation over the in-process channel registry
pub struct TenantChannelBroadcaster {
    registry: Arc<TenantChannelRegistry>,
}

impl TenantChannelBroadcaster {
    /// Create a broadcaster publishing into the given registry
    pub fn new(registry: Arc<TenantChannelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MatchEventBroadcaster for TenantChannelBroadcaster {
    async fn broadcast(&self, channel: &str, event: &str, payload: Value) -> usize {
        let frame = EventFrame::new(event, payload);
        match self.registry.publish(channel, frame) {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!("Broadcast of {} to {} failed: {}", event, channel, e);
                0
            }
        }
    }
}

/// A broadcast captured by the mock, for test assertions
#[derive(Debug, Clone)]
pub struct RecordedBroadcast {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

/// Mock broadcaster for testing
#[derive(Debug, Default)]
pub struct MockEventBroadcaster {
    broadcasts: std::sync::Mutex<Vec<RecordedBroadcast>>,
}

impl MockEventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured broadcasts (for testing)
    pub fn get_broadcasts(&self) -> Vec<RecordedBroadcast> {
        self.broadcasts
            .lock()
            .map(|broadcasts| broadcasts.clone())
            .unwrap_or_default()
    }

    /// Clear captured broadcasts (for testing)
    pub fn clear_broadcasts(&self) {
        if let Ok(mut broadcasts) = self.broadcasts.lock() {
            broadcasts.clear();
        }
    }

    /// Count captured broadcasts of a given event name
    pub fn count_events_of_type(&self, event: &str) -> usize {
        self.broadcasts
            .lock()
            .map(|broadcasts| broadcasts.iter().filter(|b| b.event == event).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MatchEventBroadcaster for MockEventBroadcaster {
    async fn broadcast(&self, channel: &str, event: &str, payload: Value) -> usize {
        if let Ok(mut broadcasts) = self.broadcasts.lock() {
            broadcasts.push(RecordedBroadcast {
                channel: channel.to_string(),
                event: event.to_string(),
                payload,
            });
        }
        1
    }
}
