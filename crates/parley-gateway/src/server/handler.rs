//! WebSocket handler
//!
//! Authenticates the handshake, then drives one connection: a read task for
//! inbound frames, a write task draining the outgoing channel, and a reaper
//! that drops connections whose heartbeats stop.

use crate::protocol::{ClientFrame, ServerEvent};
use crate::registry::Connection;
use crate::server::GatewayState;
use axum::{
    extract::{ws::Message, ws::WebSocket, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use parley_core::{RoomKey, Snowflake};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

/// Interval clients are told to heartbeat at, in milliseconds
const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

/// Connections silent for longer than this are reaped
const HEARTBEAT_TIMEOUT_MS: u64 = 90_000;

/// Channel buffer size for outgoing events
const EVENT_BUFFER_SIZE: usize = 100;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct GatewayParams {
    token: Option<String>,
}

/// WebSocket gateway handler
///
/// The session token rides on the upgrade request as a query parameter;
/// a missing, invalid, or expired token rejects the handshake with 401
/// before any socket exists.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<GatewayParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = params.token else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let claims = match state.tokens().validate(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Handshake token rejected");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Handshake token carried a bad subject");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    // The token may outlive the account; resolve the user before upgrading
    let user = match state.users().find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %user_id, "Handshake for unknown user rejected");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "User lookup failed at handshake");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, user_id, user.username, socket))
}

/// Drive an upgraded, authenticated WebSocket connection
async fn handle_socket(state: GatewayState, user_id: Snowflake, username: String, socket: WebSocket) {
    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(EVENT_BUFFER_SIZE);

    let connection = Connection::new(connection_id.clone(), user_id, username, tx);
    state.registry().register(connection.clone());

    tracing::info!(
        connection_id = %connection_id,
        user_id = %user_id,
        "WebSocket connection established"
    );

    // Every connection lives in its own inbox room plus each guild room,
    // so domain events and presence reach it without an explicit join.
    state
        .registry()
        .join(&connection_id, RoomKey::User(user_id));
    for guild_id in state.directory().guild_ids_for_user(user_id).await {
        state
            .registry()
            .join(&connection_id, RoomKey::Guild(guild_id));
    }

    if connection
        .send(ServerEvent::hello(HEARTBEAT_INTERVAL_MS))
        .await
        .is_err()
    {
        tracing::warn!(connection_id = %connection_id, "Failed to queue hello");
        cleanup_connection(&state, &connection_id).await;
        return;
    }

    state.presence().publish(user_id, true).await;

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Read task: parse and dispatch inbound frames
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match ClientFrame::from_json(&text) {
                        Ok(frame) => {
                            state_recv.router().dispatch(&connection_recv, frame).await;
                        }
                        Err(e) => {
                            // Malformed frames are dropped, never fatal
                            tracing::debug!(
                                connection_id = %connection_recv.id(),
                                error = %e,
                                "Dropping malformed frame"
                            );
                        }
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Dropping binary message"
                    );
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        connection_id = %connection_recv.id(),
                        "Client closed connection"
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return;
                }
            }
        }
    });

    // Write task: drain the outgoing channel onto the socket
    let connection_id_send = connection_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::warn!(
                            connection_id = %connection_id_send,
                            "Failed to write to WebSocket"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id_send,
                        error = %e,
                        "Failed to serialize event"
                    );
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Reaper task: drop the connection when heartbeats stop
    let connection_hb = connection.clone();
    let connection_id_hb = connection_id.clone();
    let heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(Duration::from_millis(HEARTBEAT_INTERVAL_MS / 2));

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat();
            if time_since > Duration::from_millis(HEARTBEAT_TIMEOUT_MS) {
                tracing::warn!(
                    connection_id = %connection_id_hb,
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                return;
            }
        }
    });

    let recv_abort = recv_task.abort_handle();
    let send_abort = send_task.abort_handle();
    let heartbeat_abort = heartbeat_task.abort_handle();

    tokio::select! {
        _ = recv_task => {
            tracing::debug!(connection_id = %connection_id, "Read task ended");
        }
        _ = send_task => {
            tracing::debug!(connection_id = %connection_id, "Write task ended");
        }
        _ = heartbeat_task => {
            tracing::debug!(connection_id = %connection_id, "Reaper ended connection");
        }
    }

    // The surviving tasks must not outlive the connection: a lingering read
    // task would keep dispatching frames for a connection already torn down,
    // and the write task holds the socket (and the Connection's sender) open.
    // Aborting the write task drops the sink, which closes the socket.
    recv_abort.abort();
    send_abort.abort();
    heartbeat_abort.abort();

    cleanup_connection(&state, &connection_id).await;
}

/// Tear down a connection on disconnect
///
/// Voice rosters and presence only flip when the user's last connection
/// closes; a second tab staying open keeps them online and in voice.
async fn cleanup_connection(state: &GatewayState, connection_id: &str) {
    let Some(connection) = state.registry().remove(connection_id) else {
        return;
    };

    let user_id = connection.user_id();
    tracing::info!(
        connection_id = %connection_id,
        user_id = %user_id,
        "Cleaning up connection"
    );

    if state.registry().user_connection_count(user_id) == 0 {
        state.voice().reap_user(user_id).await;
        state.presence().publish(user_id, false).await;
    }
}
