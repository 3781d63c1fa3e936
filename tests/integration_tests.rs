//! Integration tests for the courtside notification service
//!
//! These tests validate the entire system working together, including:
//! - Event ingress through the gateway to channel subscribers
//! - Multi-tenant channel isolation and per-channel ordering
//! - Role-gated facility admin surfaces
//! - WebSocket handshake and browser origin policy
//! - Payment configuration derivation from environment snapshots

// Modules for organizing tests
mod fixtures;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use courtside::broadcast::events::tenant_room;
use courtside::config::{validate_config, AppConfig, PaymentConfig};
use courtside::facility::{facility_credentials_path, facility_detail_path};
use courtside::types::{Facility, OpponentMatch};
use courtside::waitlist::WaitingListService;
use serde_json::json;
use tower::ServiceExt; // for oneshot

use fixtures::{
    admin_request, create_test_gateway, env_snapshot, ingress_request, response_json,
    ws_upgrade_request, FRONTEND_ORIGIN,
};

fn event_body(tenant_id: &str, event: &str, match_payload: &OpponentMatch) -> serde_json::Value {
    json!({
        "tenantId": tenant_id,
        "event": event,
        "match": match_payload,
    })
}

#[tokio::test]
async fn test_ingress_event_reaches_subscriber() {
    let gateway = create_test_gateway();
    let app = gateway.server.create_router();

    let mut events = gateway
        .registry
        .subscribe(&tenant_room("club-madrid"))
        .unwrap();

    let match_payload = OpponentMatch::new("club-madrid")
        .with_detail("sport", json!("padel"))
        .with_detail("playersNeeded", json!(2));
    let response = app
        .oneshot(ingress_request(&event_body(
            "club-madrid",
            "created",
            &match_payload,
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = response_json(response).await;
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["event"], "opponent-match:created");

    let frame = events.recv().await.unwrap();
    assert_eq!(frame.event, "opponent-match:created");
    assert_eq!(frame.payload["tenantId"], "club-madrid");
    assert_eq!(frame.payload["sport"], "padel");
    assert_eq!(frame.payload["playersNeeded"], 2);
}

#[tokio::test]
async fn test_events_never_cross_tenant_channels() {
    let gateway = create_test_gateway();
    let app = gateway.server.create_router();

    let mut t1 = gateway.registry.subscribe(&tenant_room("t1")).unwrap();
    let mut t2 = gateway.registry.subscribe(&tenant_room("t2")).unwrap();

    let match_payload = OpponentMatch::new("t1");
    let response = app
        .oneshot(ingress_request(&event_body(
            "t1",
            "player-joined",
            &match_payload,
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let frame = t1.recv().await.unwrap();
    assert_eq!(frame.event, "opponent-match:player-joined");

    // The other tenant's channel must stay silent
    assert!(t2.try_recv().is_err());
}

#[tokio::test]
async fn test_sequential_events_arrive_in_emission_order() {
    let gateway = create_test_gateway();

    let mut events = gateway.registry.subscribe(&tenant_room("t1")).unwrap();
    let match_payload = OpponentMatch::new("t1");

    // The full lifecycle the booking API drives, one frame per transition
    for event in ["created", "player-joined", "player-left", "completed"] {
        let response = gateway
            .server
            .create_router()
            .oneshot(ingress_request(&event_body("t1", event, &match_payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let expected = [
        "opponent-match:created",
        "opponent-match:player-joined",
        "opponent-match:player-left",
        "opponent-match:completed",
    ];
    for expected_event in expected {
        let frame = events.recv().await.unwrap();
        assert_eq!(frame.event, expected_event);
        assert_eq!(frame.payload["id"], json!(match_payload.id));
    }
}

#[tokio::test]
async fn test_ingress_accepts_events_with_no_subscribers() {
    let gateway = create_test_gateway();
    let app = gateway.server.create_router();

    // Nobody is connected for this tenant; fire-and-forget still answers 202
    let response = app
        .oneshot(ingress_request(&event_body(
            "empty-club",
            "cancelled",
            &OpponentMatch::new("empty-club"),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_ingress_rejects_malformed_requests() {
    let gateway = create_test_gateway();

    // Empty tenant id
    let response = gateway
        .server
        .create_router()
        .oneshot(ingress_request(&event_body(
            "",
            "created",
            &OpponentMatch::new(""),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Event name outside the five-event contract
    let response = gateway
        .server
        .create_router()
        .oneshot(ingress_request(&event_body(
            "t1",
            "rescheduled",
            &OpponentMatch::new("t1"),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Addressed tenant and payload tenant disagree
    let response = gateway
        .server
        .create_router()
        .oneshot(ingress_request(&event_body(
            "t1",
            "created",
            &OpponentMatch::new("t2"),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_facility_listing_is_super_admin_only() {
    let gateway = create_test_gateway();

    gateway
        .facilities
        .register_facility(Facility::new("club-madrid", "Centre Court"))
        .unwrap();

    // No identity headers at all
    let response = gateway
        .server
        .create_router()
        .oneshot(
            Request::builder()
                .uri("/facilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Authenticated but not a super admin
    let response = gateway
        .server
        .create_router()
        .oneshot(admin_request("user-1", "club-madrid", "ADMIN,USER"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Super admin passes
    let response = gateway
        .server
        .create_router()
        .oneshot(admin_request("admin-1", "club-madrid", "SUPER_ADMIN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_facility_listing_scopes_to_caller_tenant() {
    let gateway = create_test_gateway();

    let madrid = Facility::new("club-madrid", "Centre Court");
    let madrid_id = madrid.id;
    gateway.facilities.register_facility(madrid).unwrap();
    gateway
        .facilities
        .register_facility(Facility::new("club-lisbon", "River Hall"))
        .unwrap();

    let response = gateway
        .server
        .create_router()
        .oneshot(admin_request("admin-1", "club-madrid", "SUPER_ADMIN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = response_json(response).await;
    let facilities = listing["facilities"].as_array().unwrap();
    assert_eq!(facilities.len(), 1);
    assert_eq!(facilities[0]["name"], "Centre Court");
    assert_eq!(
        facilities[0]["detailPath"],
        json!(facility_detail_path(&madrid_id))
    );
    assert_eq!(
        facilities[0]["credentialsPath"],
        json!(facility_credentials_path(&madrid_id))
    );
}

#[tokio::test]
async fn test_websocket_handshake_origin_policy() {
    let gateway = create_test_gateway();

    // The allow-listed front end upgrades
    let response = gateway
        .server
        .create_router()
        .oneshot(ws_upgrade_request("club-madrid", Some(FRONTEND_ORIGIN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);

    // A non-browser client without an Origin header upgrades too
    let response = gateway
        .server
        .create_router()
        .oneshot(ws_upgrade_request("club-madrid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);

    // Any other origin is turned away before the upgrade
    let response = gateway
        .server
        .create_router()
        .oneshot(ws_upgrade_request(
            "club-madrid",
            Some("http://elsewhere.example"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_websocket_subscription_counts_toward_channel() {
    let gateway = create_test_gateway();

    let response = gateway
        .server
        .create_router()
        .oneshot(ws_upgrade_request("club-madrid", Some(FRONTEND_ORIGIN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);

    // The subscription is taken before the upgrade completes, so the channel
    // exists and has a receiver even though the socket never connected here.
    assert_eq!(
        gateway
            .registry
            .subscriber_count(&tenant_room("club-madrid"))
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_cors_preflight_reflects_allowed_origin() {
    let gateway = create_test_gateway();

    let response = gateway
        .server
        .create_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/facilities")
                .header("origin", FRONTEND_ORIGIN)
                .header("access-control-request-method", "GET")
                .header("access-control-request-headers", "x-user-roles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        FRONTEND_ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_metrics_count_ingress_events() {
    let gateway = create_test_gateway();

    for _ in 0..3 {
        let response = gateway
            .server
            .create_router()
            .oneshot(ingress_request(&event_body(
                "t1",
                "created",
                &OpponentMatch::new("t1"),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let created = gateway
        .metrics
        .broadcast()
        .match_events_total
        .with_label_values(&["opponent-match:created"]);
    assert_eq!(created.get(), 3);
}

#[test]
fn test_payment_config_from_environment_snapshot() {
    let lookup = env_snapshot(&[
        ("NODE_ENV", "production"),
        ("API_URL", "https://api.example.com"),
        ("FRONTEND_URL", "https://booking.example.com"),
        ("MERCADOPAGO_PUBLIC_KEY", "APP-pub"),
        ("MERCADOPAGO_EXPIRATION_MINUTES", "45"),
    ]);
    let config = PaymentConfig::from_lookup(&lookup);

    assert!(!config.is_sandbox);
    assert_eq!(config.default_public_key, "APP-pub");
    assert_eq!(config.expiration_minutes, 45);
    assert_eq!(config.default_currency, "ARS");
    assert_eq!(
        config.webhook_url,
        "https://api.example.com/api/v1/webhooks/mercadopago"
    );
    assert_eq!(
        config.default_success_url,
        "https://booking.example.com/payments/success"
    );

    // Same snapshot, same settings
    assert_eq!(config, PaymentConfig::from_lookup(&lookup));
}

#[test]
fn test_payment_config_defaults_without_environment() {
    let config = PaymentConfig::from_lookup(env_snapshot(&[]));

    assert!(config.is_sandbox);
    assert_eq!(config.expiration_minutes, 30);
    assert_eq!(config.default_currency, "ARS");
    assert_eq!(
        config.webhook_url,
        "http://localhost:3001/api/v1/webhooks/mercadopago"
    );
}

#[test]
fn test_app_config_defaults_validate() {
    let config = AppConfig::default();
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.gateway.allowed_origin, FRONTEND_ORIGIN);
}

#[test]
fn test_waiting_list_boundary_constructs() {
    let _service = WaitingListService::new();
}
