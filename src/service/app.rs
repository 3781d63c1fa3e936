//! Main application state and service coordination
//!
//! This module contains the production AppState that coordinates the channel
//! registry, the gateway and metrics servers, and background maintenance
//! tasks.

use crate::broadcast::publisher::{MatchEventBroadcaster, TenantChannelBroadcaster};
use crate::broadcast::registry::TenantChannelRegistry;
use crate::config::{validate_config, AppConfig};
use crate::facility::{FacilityDirectory, StaticFacilityDirectory};
use crate::gateway::server::{GatewayServer, GatewayServerConfig, GatewayState};
use crate::metrics::health::HealthServerConfig;
use crate::metrics::{HealthServer, MetricsCollector, MetricsService};
use crate::waitlist::WaitingListService;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Cloneable view of the running service, handed to the health probes
#[derive(Clone)]
pub struct ServiceHandle {
    pub(crate) service_name: String,
    pub(crate) is_running: Arc<RwLock<bool>>,
    pub(crate) registry: Arc<TenantChannelRegistry>,
    pub(crate) metrics: Arc<MetricsCollector>,
    pub(crate) started_at: Instant,
}

impl ServiceHandle {
    /// Service name as configured
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Whether the service has been started and not yet shut down
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Channel registry backing the tenant streams
    pub fn registry(&self) -> Arc<TenantChannelRegistry> {
        self.registry.clone()
    }

    /// Metrics collector, for gauge reads in stats reporting
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Seconds since the service was constructed
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Tenant channel registry backing every event stream
    registry: Arc<TenantChannelRegistry>,

    /// Broadcaster the ingress path publishes through
    broadcaster: Arc<dyn MatchEventBroadcaster>,

    /// Facility directory for the admin surface
    facilities: Arc<dyn FacilityDirectory>,

    /// Waiting list boundary (construct-only today)
    waitlist: WaitingListService,

    /// Metrics service for monitoring and health checks
    metrics_service: Arc<MetricsService>,

    /// Gateway HTTP and WebSocket server
    gateway_server: Arc<GatewayServer>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    /// Construction instant, for uptime reporting
    started_at: Instant,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing courtside notification service");
        info!(
            "Configuration: service={}, http_port={}, metrics_port={}",
            config.service.name, config.service.http_port, config.service.metrics_port
        );

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let registry = Arc::new(TenantChannelRegistry::new(config.gateway.channel_capacity));
        let broadcaster: Arc<dyn MatchEventBroadcaster> =
            Arc::new(TenantChannelBroadcaster::new(registry.clone()));
        let facilities: Arc<dyn FacilityDirectory> = Arc::new(StaticFacilityDirectory::new());
        let waitlist = WaitingListService::new();
        let is_running = Arc::new(RwLock::new(false));
        let started_at = Instant::now();

        // Initialize metrics service
        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );
        metrics_collector.set_payment_sandbox_mode(config.payment.is_sandbox);
        if config.payment.is_sandbox {
            info!("Payment configuration loaded in sandbox mode");
        } else {
            info!("Payment configuration loaded in production mode");
        }

        let handle = ServiceHandle {
            service_name: config.service.name.clone(),
            is_running: is_running.clone(),
            registry: registry.clone(),
            metrics: metrics_collector.clone(),
            started_at,
        };

        let health_config = HealthServerConfig {
            port: config.service.metrics_port,
            host: "0.0.0.0".to_string(),
        };
        let health_server = Arc::new(
            HealthServer::new(health_config, metrics_collector.clone())
                .with_service_handle(handle),
        );
        let metrics_service = Arc::new(MetricsService::new(metrics_collector, health_server));

        // Initialize gateway server
        let gateway_config = GatewayServerConfig {
            port: config.service.http_port,
            host: "0.0.0.0".to_string(),
        };
        let gateway_state = GatewayState {
            registry: registry.clone(),
            broadcaster: broadcaster.clone(),
            facilities: facilities.clone(),
            metrics: metrics_service.collector(),
            allowed_origin: config.gateway.allowed_origin.clone(),
        };
        let gateway_server = Arc::new(GatewayServer::new(gateway_config, gateway_state));

        Ok(Self {
            config,
            registry,
            broadcaster,
            facilities,
            waitlist,
            metrics_service,
            gateway_server,
            background_tasks: Vec::new(),
            is_running,
            started_at,
        })
    }

    /// Start the servers and background maintenance tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting courtside notification service");

        // Mark as running
        *self.is_running.write().await = true;

        // Start metrics service first so probes come up before traffic
        self.start_metrics_service().await?;

        // Start the gateway
        self.start_gateway_server().await?;

        // Start background tasks
        self.start_background_tasks().await?;

        info!("✅ Courtside notification service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of courtside service");

        // Mark as not running
        *self.is_running.write().await = false;

        // Stop the gateway first so no new clients or events arrive
        if let Err(e) = self.gateway_server.stop().await {
            warn!("Failed to stop gateway server: {}", e);
        } else {
            info!("✅ Gateway server stopped");
        }

        // Stop metrics service
        info!("Stopping metrics service...");
        if let Err(e) = self.metrics_service.stop().await {
            warn!("Failed to stop metrics service: {}", e);
        } else {
            info!("✅ Metrics service stopped");
        }

        // Stop background tasks (including the server tasks)
        self.stop_background_tasks().await;

        // Get final statistics
        let final_stats =
            self.registry
                .stats()
                .map_err(|e| ServiceError::BackgroundTask {
                    message: format!("Failed to get final stats: {}", e),
                })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("✅ Courtside service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the tenant channel registry
    pub fn registry(&self) -> Arc<TenantChannelRegistry> {
        self.registry.clone()
    }

    /// Get the event broadcaster
    pub fn broadcaster(&self) -> Arc<dyn MatchEventBroadcaster> {
        self.broadcaster.clone()
    }

    /// Get the facility directory
    pub fn facilities(&self) -> Arc<dyn FacilityDirectory> {
        self.facilities.clone()
    }

    /// Get the waiting list boundary
    pub fn waitlist(&self) -> &WaitingListService {
        &self.waitlist
    }

    /// Get metrics service
    pub fn metrics_service(&self) -> Arc<MetricsService> {
        self.metrics_service.clone()
    }

    /// Get the gateway server
    pub fn gateway_server(&self) -> Arc<GatewayServer> {
        self.gateway_server.clone()
    }

    /// Build a health probe view of this service
    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            service_name: self.config.service.name.clone(),
            is_running: self.is_running.clone(),
            registry: self.registry.clone(),
            metrics: self.metrics_service.collector(),
            started_at: self.started_at,
        }
    }

    /// Start metrics service
    async fn start_metrics_service(&mut self) -> Result<(), ServiceError> {
        info!("Starting metrics and health endpoints");

        // Clone necessary references for the background task
        let metrics_service = self.metrics_service.clone();
        let port = self.config.service.metrics_port;

        // Spawn the metrics service as a background task
        let metrics_handle = tokio::spawn(async move {
            if let Err(e) = metrics_service.start().await {
                error!("Metrics service failed: {}", e);
            } else {
                info!("Metrics service task completed");
            }
        });

        // Add the handle to background tasks for proper shutdown
        self.background_tasks.push(metrics_handle);

        // Give the server a moment to start up
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        info!("✅ Metrics service started on port {}", port);
        Ok(())
    }

    /// Start the gateway server
    async fn start_gateway_server(&mut self) -> Result<(), ServiceError> {
        info!(
            "Starting gateway server on port {}",
            self.config.service.http_port
        );

        let gateway_server = self.gateway_server.clone();
        let port = self.config.service.http_port;

        let gateway_handle = tokio::spawn(async move {
            if let Err(e) = gateway_server.start().await {
                error!("Gateway server failed: {}", e);
            } else {
                info!("Gateway server task completed");
            }
        });

        self.background_tasks.push(gateway_handle);

        // Give the server a moment to start up
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        info!("✅ Gateway server started on port {}", port);
        Ok(())
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(&mut self) -> Result<(), ServiceError> {
        info!("Starting background maintenance tasks...");

        // Channel stats task
        info!(
            "Starting channel stats task ({}s interval)...",
            self.config.stats_interval().as_secs()
        );
        let stats_task = {
            let registry = self.registry.clone();
            let metrics_collector = self.metrics_service.collector();
            let is_running = self.is_running.clone();
            let stats_interval = self.config.stats_interval();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(stats_interval);
                info!("Channel stats task started");

                while *is_running.read().await {
                    interval.tick().await;

                    match registry.stats() {
                        Ok(stats) => {
                            debug!(
                                "Updating metrics - channels: {}, subscribers: {}",
                                stats.active_channels, stats.total_subscribers
                            );
                            metrics_collector.update_channel_stats(&stats);
                        }
                        Err(e) => {
                            warn!("Failed to get channel stats for metrics update: {}", e);
                        }
                    }
                }

                info!("Channel stats task stopped");
            })
        };

        // Idle channel sweep task
        info!(
            "Starting channel sweep task ({}s interval)...",
            self.config.sweep_interval().as_secs()
        );
        let sweep_task = {
            let registry = self.registry.clone();
            let metrics_collector = self.metrics_service.collector();
            let is_running = self.is_running.clone();
            let sweep_interval = self.config.sweep_interval();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(sweep_interval);
                info!("Channel sweep task started");

                while *is_running.read().await {
                    interval.tick().await;

                    match registry.prune_idle() {
                        Ok(pruned) => {
                            if pruned > 0 {
                                metrics_collector.record_channels_pruned(pruned as u64);
                                info!("Pruned {} idle tenant channel(s)", pruned);
                            } else {
                                debug!("Sweep completed - no idle channels found");
                            }
                        }
                        Err(e) => {
                            warn!("Channel sweep failed: {}", e);
                        }
                    }
                }

                info!("Channel sweep task stopped");
            })
        };

        // Service health metrics task
        info!("Starting health metrics task (60s interval)...");
        let health_metrics_task = {
            let metrics_collector = self.metrics_service.collector();
            let is_running = self.is_running.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    // Update service uptime
                    let uptime_seconds = started_at.elapsed().as_secs();
                    metrics_collector.update_uptime(uptime_seconds);

                    debug!(
                        "Updated service health metrics - uptime: {}s",
                        uptime_seconds
                    );

                    // Update health status (assume healthy for now)
                    metrics_collector.update_health_status(2); // 2 = healthy

                    // Update component health
                    metrics_collector.update_component_health("channel_registry", true);
                    metrics_collector.update_component_health("gateway", true);
                    metrics_collector.update_component_health("metrics", true);
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.push(stats_task);
        self.background_tasks.push(sweep_task);
        self.background_tasks.push(health_metrics_task);

        info!("3 background maintenance tasks started successfully");
        Ok(())
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);

        // Cancel all background tasks
        for (i, task) in self.background_tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        // Give tasks time to clean up gracefully
        info!("Waiting for background tasks to complete shutdown...");
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        info!("✅ All {} background tasks stopped", task_count);
    }
}
