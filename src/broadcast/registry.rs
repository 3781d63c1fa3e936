//! Tenant channel registry
//!
//! Channels are created lazily when the first subscriber joins and swept once
//! every subscriber is gone. Publishing to a channel nobody listens to is a
//! successful no-op; the fire-and-forget contract has no failure to report.

use crate::broadcast::events::EventFrame;
use crate::error::{GatewayError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

/// Snapshot of registry occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub active_channels: usize,
    pub total_subscribers: usize,
}

/// Per-tenant broadcast channels behind a single registry lock.
///
/// Lock sections are short and never held across awaits; subscribers hold
/// plain `broadcast::Receiver`s that outlive the lock.
pub struct TenantChannelRegistry {
    channels: RwLock<HashMap<String, broadcast::Sender<EventFrame>>>,
    capacity: usize,
}

impl TenantChannelRegistry {
    /// Create a registry whose channels buffer `capacity` frames each
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Join a channel, creating it on first subscribe
    pub fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<EventFrame>> {
        let mut channels =
            self.channels
                .write()
                .map_err(|_| GatewayError::ChannelRegistryFailed {
                    message: "Failed to acquire channel registry write lock".to_string(),
                })?;

        let sender = channels.entry(channel.to_string()).or_insert_with(|| {
            debug!("Creating channel {}", channel);
            broadcast::channel(self.capacity).0
        });

        Ok(sender.subscribe())
    }

    /// Deliver a frame to every current subscriber of a channel.
    ///
    /// Returns the number of subscribers reached; 0 when the channel does not
    /// exist or has no receivers, which is success for this contract.
    pub fn publish(&self, channel: &str, frame: EventFrame) -> Result<usize> {
        let channels = self
            .channels
            .read()
            .map_err(|_| GatewayError::ChannelRegistryFailed {
                message: "Failed to acquire channel registry read lock".to_string(),
            })?;

        match channels.get(channel) {
            Some(sender) => Ok(sender.send(frame).unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Number of live subscribers on a channel
    pub fn subscriber_count(&self, channel: &str) -> Result<usize> {
        let channels = self
            .channels
            .read()
            .map_err(|_| GatewayError::ChannelRegistryFailed {
                message: "Failed to acquire channel registry read lock".to_string(),
            })?;

        Ok(channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0))
    }

    /// Drop channels whose subscribers have all disconnected.
    ///
    /// Returns how many channels were removed.
    pub fn prune_idle(&self) -> Result<usize> {
        let mut channels =
            self.channels
                .write()
                .map_err(|_| GatewayError::ChannelRegistryFailed {
                    message: "Failed to acquire channel registry write lock".to_string(),
                })?;

        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        let pruned = before - channels.len();

        if pruned > 0 {
            debug!("Pruned {} idle channel(s)", pruned);
        }
        Ok(pruned)
    }

    /// Current channel and subscriber totals
    pub fn stats(&self) -> Result<RegistryStats> {
        let channels = self
            .channels
            .read()
            .map_err(|_| GatewayError::ChannelRegistryFailed {
                message: "Failed to acquire channel registry read lock".to_string(),
            })?;

        Ok(RegistryStats {
            active_channels: channels.len(),
            total_subscribers: channels.values().map(|s| s.receiver_count()).sum(),
        })
    }
}
