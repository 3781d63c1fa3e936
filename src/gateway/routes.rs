//! HTTP routes for event ingress and the facility admin surface

use crate::auth::{self, Role, UserContext};
use crate::broadcast::events::MatchEventKind;
use crate::facility::{facility_credentials_path, facility_detail_path};
use crate::gateway::server::GatewayState;
use crate::types::{Facility, FacilityId, OpponentMatch};
use crate::utils::validate_tenant_id;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

/// Ingress payload the booking API posts for each match transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishMatchEventRequest {
    pub tenant_id: String,
    pub event: MatchEventKind,
    #[serde(rename = "match")]
    pub match_payload: OpponentMatch,
}

/// Accept an opponent-match event and fan it out to the tenant's channel.
///
/// Acceptance means the event was handed to the broadcaster, not that any
/// subscriber received it. Zero subscribers is a normal outcome.
pub(crate) async fn publish_match_event(
    State(state): State<GatewayState>,
    Json(request): Json<PublishMatchEventRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_tenant_id(&request.tenant_id) {
        warn!("Rejected match event with invalid tenant id: {}", e);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        );
    }

    if request.match_payload.tenant_id != request.tenant_id {
        warn!(
            "Rejected {} addressed to tenant {} but carrying payload for tenant {}",
            request.event.event_name(),
            request.tenant_id,
            request.match_payload.tenant_id
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Payload tenant does not match addressed tenant" })),
        );
    }

    let timer = state.metrics.start_timer();
    state
        .broadcaster
        .emit_match_event(request.event, &request.tenant_id, &request.match_payload)
        .await;
    state
        .metrics
        .record_match_event(request.event.event_name(), timer.stop());

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "accepted",
            "event": request.event.event_name(),
            "tenantId": request.tenant_id,
        })),
    )
}

/// Facility summary shaped for admin navigation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityView {
    pub id: FacilityId,
    pub name: String,
    pub detail_path: String,
    pub credentials_path: String,
}

impl From<&Facility> for FacilityView {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id,
            name: facility.name.clone(),
            detail_path: facility_detail_path(&facility.id),
            credentials_path: facility_credentials_path(&facility.id),
        }
    }
}

/// List the caller's facilities with their admin navigation paths.
///
/// Denies closed: a request without a parseable identity never reaches the
/// directory.
pub(crate) async fn list_facilities(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user = match UserContext::from_headers(&headers) {
        Ok(user) => user,
        Err(e) => {
            warn!("Rejected facility listing: {}", e);
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": e.to_string() })),
            );
        }
    };

    if let Err(e) = auth::require_any_role(&user, &[Role::SuperAdmin]) {
        warn!("User {} denied facility listing: {}", user.user_id, e);
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": e.to_string() })),
        );
    }

    match state.facilities.list_facilities(&user.tenant_id).await {
        Ok(facilities) => {
            let views: Vec<FacilityView> = facilities.iter().map(FacilityView::from).collect();
            debug!(
                "Listed {} facilities for tenant {}",
                views.len(),
                user.tenant_id
            );
            (StatusCode::OK, Json(json!({ "facilities": views })))
        }
        Err(e) => {
            error!(
                "Facility listing failed for tenant {}: {}",
                user.tenant_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to list facilities" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::events::tenant_room;
    use crate::broadcast::publisher::{MockEventBroadcaster, TenantChannelBroadcaster};
    use crate::broadcast::registry::TenantChannelRegistry;
    use crate::facility::StaticFacilityDirectory;
    use crate::gateway::server::{GatewayServer, GatewayServerConfig};
    use crate::metrics::collector::MetricsCollector;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    struct TestGateway {
        broadcaster: Arc<MockEventBroadcaster>,
        facilities: Arc<StaticFacilityDirectory>,
        server: GatewayServer,
    }

    fn test_gateway() -> TestGateway {
        let registry = Arc::new(TenantChannelRegistry::new(8));
        let broadcaster = Arc::new(MockEventBroadcaster::new());
        let facilities = Arc::new(StaticFacilityDirectory::new());

        let state = GatewayState {
            registry,
            broadcaster: broadcaster.clone(),
            facilities: facilities.clone(),
            metrics: Arc::new(MetricsCollector::new().expect("Failed to create collector")),
            allowed_origin: "http://localhost:3000".to_string(),
        };

        TestGateway {
            broadcaster,
            facilities,
            server: GatewayServer::new(GatewayServerConfig::default(), state),
        }
    }

    fn ingress_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/internal/events/opponent-match")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_ingress_accepts_match_event() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let match_payload = OpponentMatch::new("club-madrid")
            .with_detail("sport", json!("padel"))
            .with_detail("playersNeeded", json!(2));
        let body = json!({
            "tenantId": "club-madrid",
            "event": "created",
            "match": match_payload,
        });

        let response = app.oneshot(ingress_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let accepted = response_json(response).await;
        assert_eq!(accepted["status"], "accepted");
        assert_eq!(accepted["event"], "opponent-match:created");

        let broadcasts = gateway.broadcaster.get_broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].channel, tenant_room("club-madrid"));
        assert_eq!(broadcasts[0].event, "opponent-match:created");
        assert_eq!(broadcasts[0].payload["sport"], "padel");
    }

    #[tokio::test]
    async fn test_ingress_rejects_invalid_tenant() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let body = json!({
            "tenantId": "",
            "event": "created",
            "match": OpponentMatch::new(""),
        });

        let response = app.oneshot(ingress_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(gateway.broadcaster.get_broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_ingress_rejects_tenant_mismatch() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let body = json!({
            "tenantId": "club-madrid",
            "event": "player-joined",
            "match": OpponentMatch::new("club-lisbon"),
        });

        let response = app.oneshot(ingress_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(gateway.broadcaster.get_broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_ingress_rejects_unknown_event() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let body = json!({
            "tenantId": "club-madrid",
            "event": "rescheduled",
            "match": OpponentMatch::new("club-madrid"),
        });

        let response = app.oneshot(ingress_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(gateway.broadcaster.get_broadcasts().is_empty());
    }

    #[tokio::test]
    async fn test_ingress_delivers_through_real_registry() {
        let registry = Arc::new(TenantChannelRegistry::new(8));
        let state = GatewayState {
            registry: registry.clone(),
            broadcaster: Arc::new(TenantChannelBroadcaster::new(registry.clone())),
            facilities: Arc::new(StaticFacilityDirectory::new()),
            metrics: Arc::new(MetricsCollector::new().expect("Failed to create collector")),
            allowed_origin: "http://localhost:3000".to_string(),
        };
        let app = GatewayServer::new(GatewayServerConfig::default(), state).create_router();

        let mut events = registry
            .subscribe(&tenant_room("club-madrid"))
            .expect("Failed to subscribe");

        let body = json!({
            "tenantId": "club-madrid",
            "event": "completed",
            "match": OpponentMatch::new("club-madrid"),
        });
        let response = app.oneshot(ingress_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let frame = events.recv().await.expect("Expected delivered frame");
        assert_eq!(frame.event, "opponent-match:completed");
    }

    fn admin_request(roles: &str) -> Request<Body> {
        Request::builder()
            .uri("/facilities")
            .header("x-user-id", "user-1")
            .header("x-tenant-id", "club-madrid")
            .header("x-user-roles", roles)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_facilities_requires_identity() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/facilities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_facilities_denies_non_super_admin() {
        let gateway = test_gateway();
        let app = gateway.server.create_router();

        let response = app.oneshot(admin_request("ADMIN,USER")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_facilities_lists_for_super_admin() {
        let gateway = test_gateway();

        let facility = Facility::new("club-madrid", "Centre Court");
        let facility_id = facility.id;
        gateway
            .facilities
            .register_facility(facility)
            .expect("Failed to register facility");
        gateway
            .facilities
            .register_facility(Facility::new("club-lisbon", "River Hall"))
            .expect("Failed to register facility");

        let app = gateway.server.create_router();
        let response = app.oneshot(admin_request("SUPER_ADMIN")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listing = response_json(response).await;
        let facilities = listing["facilities"].as_array().unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0]["name"], "Centre Court");
        assert_eq!(
            facilities[0]["detailPath"],
            format!("/facilities/{}", facility_id)
        );
        assert_eq!(
            facilities[0]["credentialsPath"],
            format!("/facilities/{}/credentials", facility_id)
        );
    }
}
