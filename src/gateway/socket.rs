//! Per-client WebSocket sessions over tenant channels
//!
//! Each connection subscribes to exactly one tenant channel and receives the
//! event frames published there as JSON text frames. The stream is one-way;
//! inbound frames are drained and ignored apart from close.

use crate::broadcast::events::tenant_room;
use crate::broadcast::events::EventFrame;
use crate::gateway::server::GatewayState;
use crate::metrics::collector::MetricsCollector;
use crate::utils::validate_tenant_id;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Upgrade handler for `/ws/{tenant_id}`.
///
/// The channel subscription is taken before the upgrade completes, so a
/// client that connects and immediately sees an event published has not
/// raced the handshake.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
    State(state): State<GatewayState>,
) -> Response {
    if !origin_allowed(&headers, &state.allowed_origin) {
        warn!(
            "Rejected WebSocket handshake for tenant {} from disallowed origin",
            tenant_id
        );
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    if let Err(e) = validate_tenant_id(&tenant_id) {
        warn!("Rejected WebSocket handshake: {}", e);
        return (StatusCode::BAD_REQUEST, "Invalid tenant id").into_response();
    }

    let events = match state.registry.subscribe(&tenant_room(&tenant_id)) {
        Ok(events) => events,
        Err(e) => {
            error!(
                "Failed to subscribe WebSocket client to tenant {}: {}",
                tenant_id, e
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Subscription failed").into_response();
        }
    };

    let metrics = state.metrics.clone();
    ws.on_upgrade(move |socket| client_session(socket, tenant_id, events, metrics))
}

/// Pump events from the tenant channel into one client socket until either
/// side goes away.
async fn client_session(
    socket: WebSocket,
    tenant_id: String,
    mut events: broadcast::Receiver<EventFrame>,
    metrics: Arc<MetricsCollector>,
) {
    metrics.record_client_connected();
    info!("WebSocket client connected for tenant {}", tenant_id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(frame) => {
                    let text = match frame.to_text() {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(
                                "Skipping undeliverable frame for tenant {}: {}",
                                tenant_id, e
                            );
                            continue;
                        }
                    };

                    if sink.send(Message::Text(text.into())).await.is_err() {
                        debug!(
                            "WebSocket send failed for tenant {}, closing session",
                            tenant_id
                        );
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Slow consumer; the channel dropped its oldest frames
                    // rather than stall every other subscriber.
                    warn!(
                        "WebSocket client for tenant {} lagged, skipped {} frame(s)",
                        tenant_id, skipped
                    );
                    metrics.record_frames_dropped(skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("Tenant channel {} closed, ending session", tenant_id);
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {
                    // Inbound frames are not part of the protocol; ignore.
                }
            },
        }
    }

    metrics.record_client_disconnected();
    info!("WebSocket client disconnected for tenant {}", tenant_id);
}

/// Browsers send an Origin header; non-browser clients usually do not.
/// Absent means a server-side consumer and is allowed, present must match
/// the allow-listed front end exactly.
fn origin_allowed(headers: &HeaderMap, allowed_origin: &str) -> bool {
    match headers.get(header::ORIGIN) {
        Some(origin) => origin.as_bytes() == allowed_origin.as_bytes(),
        None => true,
    }
}
