//! Test fixtures and helpers for integration testing

use axum::body::Body;
use axum::http::Request;
use courtside::broadcast::publisher::TenantChannelBroadcaster;
use courtside::broadcast::registry::TenantChannelRegistry;
use courtside::facility::StaticFacilityDirectory;
use courtside::gateway::{GatewayServer, GatewayServerConfig, GatewayState};
use courtside::metrics::MetricsCollector;
use std::sync::Arc;

/// Origin the test gateway allow-lists, mirroring the front-end default
pub const FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// A fully wired gateway backed by the real in-process broadcaster
pub struct TestGateway {
    pub registry: Arc<TenantChannelRegistry>,
    pub facilities: Arc<StaticFacilityDirectory>,
    pub metrics: Arc<MetricsCollector>,
    pub server: GatewayServer,
}

/// Build a complete gateway the way the service wires it in production,
/// minus the listeners
pub fn create_test_gateway() -> TestGateway {
    let registry = Arc::new(TenantChannelRegistry::new(64));
    let facilities = Arc::new(StaticFacilityDirectory::new());
    let metrics = Arc::new(MetricsCollector::new().expect("Failed to create metrics collector"));

    let state = GatewayState {
        registry: registry.clone(),
        broadcaster: Arc::new(TenantChannelBroadcaster::new(registry.clone())),
        facilities: facilities.clone(),
        metrics: metrics.clone(),
        allowed_origin: FRONTEND_ORIGIN.to_string(),
    };

    TestGateway {
        registry,
        facilities,
        metrics,
        server: GatewayServer::new(GatewayServerConfig::default(), state),
    }
}

/// POST an opponent-match event the way the booking API does
pub fn ingress_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/internal/events/opponent-match")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build ingress request")
}

/// GET the facility listing with trusted identity headers attached
pub fn admin_request(user_id: &str, tenant_id: &str, roles: &str) -> Request<Body> {
    Request::builder()
        .uri("/facilities")
        .header("x-user-id", user_id)
        .header("x-tenant-id", tenant_id)
        .header("x-user-roles", roles)
        .body(Body::empty())
        .expect("Failed to build admin request")
}

/// Build a WebSocket handshake request for a tenant stream
pub fn ws_upgrade_request(tenant_id: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(format!("/ws/{}", tenant_id))
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==");

    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }

    builder
        .body(Body::empty())
        .expect("Failed to build upgrade request")
}

/// Decode a JSON response body
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Response body was not valid JSON")
}

/// Environment snapshot for payment configuration tests; keeps the tests
/// independent of process-global state
pub fn env_snapshot<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key: &str| {
        pairs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    }
}
