//! HTTP and WebSocket server fronting the tenant channels
//!
//! This module wires the gateway routes, the browser origin policy, and the
//! listener lifecycle together using Axum.

use crate::broadcast::publisher::MatchEventBroadcaster;
use crate::broadcast::registry::TenantChannelRegistry;
use crate::facility::FacilityDirectory;
use crate::gateway::{routes, socket};
use crate::metrics::collector::MetricsCollector;
use anyhow::{Context, Result};
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayServerConfig {
    /// Port to bind the gateway to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for gateway handlers
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<TenantChannelRegistry>,
    pub broadcaster: Arc<dyn MatchEventBroadcaster>,
    pub facilities: Arc<dyn FacilityDirectory>,
    pub metrics: Arc<MetricsCollector>,
    pub allowed_origin: String,
}

/// Gateway server carrying the event stream, ingress, and facility routes
pub struct GatewayServer {
    config: GatewayServerConfig,
    state: GatewayState,
    shutdown_tx: broadcast::Sender<()>,
}

impl GatewayServer {
    /// Create a new gateway server
    pub fn new(config: GatewayServerConfig, state: GatewayState) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Start the gateway server
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid gateway server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("Gateway server listening on http://{}", addr);

        // Create a shutdown receiver for this task
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        // Serve with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Gateway server shutdown signal received");
            })
            .await?;

        info!("Gateway server stopped");
        Ok(())
    }

    /// Create the Axum router with all gateway endpoints
    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/ws/{tenant_id}", get(socket::ws_handler))
            .route(
                "/internal/events/opponent-match",
                post(routes::publish_match_event),
            )
            .route("/facilities", get(routes::list_facilities))
            .layer(cors_layer(&self.state.allowed_origin))
            .with_state(self.state.clone())
    }

    /// Stop the gateway server
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping gateway server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to gateway server: {}", e);
        }

        info!("Gateway server stop signal sent");
        Ok(())
    }
}

/// Browser origin policy for the booking front end.
///
/// Exactly one origin is allow-listed and credentialed requests are accepted
/// from it. `Access-Control-Allow-Origin: *` is off the table because the
/// front end sends cookies.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = allowed_origin.to_string();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |value: &HeaderValue, _request| value.as_bytes() == origin.as_bytes(),
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(crate::auth::USER_ID_HEADER),
            HeaderName::from_static(crate::auth::TENANT_ID_HEADER),
            HeaderName::from_static(crate::auth::USER_ROLES_HEADER),
        ])
        .allow_credentials(true)
}
