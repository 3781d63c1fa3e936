//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the courtside notification
//! service: channel occupancy, event throughput, websocket connections, and
//! service health.

use crate::broadcast::registry::RegistryStats;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the notification service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Broadcast and channel metrics
    broadcast_metrics: BroadcastMetrics,

    /// Websocket connection metrics
    connection_metrics: ConnectionMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,

    /// Whether the payment integration runs against the sandbox (0/1)
    pub payment_sandbox_mode: IntGauge,
}

/// Broadcast and channel metrics
#[derive(Clone)]
pub struct BroadcastMetrics {
    /// Total match events emitted, by event name
    pub match_events_total: IntCounterVec,

    /// Tenant channels currently open
    pub active_channels: IntGauge,

    /// Subscribers across all tenant channels
    pub channel_subscribers: IntGauge,

    /// Frames skipped by lagging subscribers
    pub frames_dropped_total: IntCounter,

    /// Idle channels removed by the sweep task
    pub channels_pruned_total: IntCounter,

    /// Time spent emitting a single event
    pub broadcast_duration_seconds: Histogram,
}

/// Websocket connection metrics
#[derive(Clone)]
pub struct ConnectionMetrics {
    /// Total websocket connections accepted
    pub ws_connections_total: IntCounter,

    /// Total websocket disconnects
    pub ws_disconnects_total: IntCounter,

    /// Clients currently connected
    pub connected_clients: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let broadcast_metrics = BroadcastMetrics::new(&registry)?;
        let connection_metrics = ConnectionMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            broadcast_metrics,
            connection_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get broadcast metrics
    pub fn broadcast(&self) -> &BroadcastMetrics {
        &self.broadcast_metrics
    }

    /// Get connection metrics
    pub fn connection(&self) -> &ConnectionMetrics {
        &self.connection_metrics
    }

    /// Record a match event emission
    pub fn record_match_event(&self, event: &str, duration: Duration) {
        self.broadcast_metrics
            .match_events_total
            .with_label_values(&[event])
            .inc();

        self.broadcast_metrics
            .broadcast_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Record frames skipped by a lagging subscriber
    pub fn record_frames_dropped(&self, skipped: u64) {
        self.broadcast_metrics.frames_dropped_total.inc_by(skipped);
    }

    /// Record idle channels removed by the sweep
    pub fn record_channels_pruned(&self, pruned: u64) {
        self.broadcast_metrics.channels_pruned_total.inc_by(pruned);
    }

    /// Update channel occupancy gauges from a registry snapshot
    pub fn update_channel_stats(&self, stats: &RegistryStats) {
        self.broadcast_metrics
            .active_channels
            .set(stats.active_channels as i64);
        self.broadcast_metrics
            .channel_subscribers
            .set(stats.total_subscribers as i64);
    }

    /// Record a websocket client joining
    pub fn record_client_connected(&self) {
        self.connection_metrics.ws_connections_total.inc();
        self.connection_metrics.connected_clients.inc();
    }

    /// Record a websocket client leaving
    pub fn record_client_disconnected(&self) {
        self.connection_metrics.ws_disconnects_total.inc();
        self.connection_metrics.connected_clients.dec();
    }

    /// Update service uptime
    pub fn update_uptime(&self, uptime_seconds: u64) {
        self.service_metrics
            .uptime_seconds
            .set(uptime_seconds as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Record whether payments run in sandbox mode
    pub fn set_payment_sandbox_mode(&self, is_sandbox: bool) {
        self.service_metrics
            .payment_sandbox_mode
            .set(if is_sandbox { 1 } else { 0 });
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("courtside_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "courtside_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("courtside_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        let payment_sandbox_mode = IntGauge::new(
            "courtside_payment_sandbox_mode",
            "Whether the payment integration runs against the sandbox (0/1)",
        )?;
        registry.register(Box::new(payment_sandbox_mode.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
            payment_sandbox_mode,
        })
    }
}

impl BroadcastMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let match_events_total = IntCounterVec::new(
            Opts::new(
                "courtside_match_events_total",
                "Total match events emitted",
            ),
            &["event"],
        )?;
        registry.register(Box::new(match_events_total.clone()))?;

        let active_channels = IntGauge::new(
            "courtside_active_channels",
            "Tenant channels currently open",
        )?;
        registry.register(Box::new(active_channels.clone()))?;

        let channel_subscribers = IntGauge::new(
            "courtside_channel_subscribers",
            "Subscribers across all tenant channels",
        )?;
        registry.register(Box::new(channel_subscribers.clone()))?;

        let frames_dropped_total = IntCounter::new(
            "courtside_frames_dropped_total",
            "Frames skipped by lagging subscribers",
        )?;
        registry.register(Box::new(frames_dropped_total.clone()))?;

        let channels_pruned_total = IntCounter::new(
            "courtside_channels_pruned_total",
            "Idle channels removed by the sweep task",
        )?;
        registry.register(Box::new(channels_pruned_total.clone()))?;

        let broadcast_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "courtside_broadcast_duration_seconds",
            "Time spent emitting a single event",
        ))?;
        registry.register(Box::new(broadcast_duration_seconds.clone()))?;

        Ok(Self {
            match_events_total,
            active_channels,
            channel_subscribers,
            frames_dropped_total,
            channels_pruned_total,
            broadcast_duration_seconds,
        })
    }
}

impl ConnectionMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let ws_connections_total = IntCounter::new(
            "courtside_ws_connections_total",
            "Total websocket connections accepted",
        )?;
        registry.register(Box::new(ws_connections_total.clone()))?;

        let ws_disconnects_total = IntCounter::new(
            "courtside_ws_disconnects_total",
            "Total websocket disconnects",
        )?;
        registry.register(Box::new(ws_disconnects_total.clone()))?;

        let connected_clients = IntGauge::new(
            "courtside_connected_clients",
            "Clients currently connected",
        )?;
        registry.register(Box::new(connected_clients.clone()))?;

        Ok(Self {
            ws_connections_total,
            ws_disconnects_total,
            connected_clients,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
