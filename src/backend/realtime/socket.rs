/**
 * WebSocket Endpoint
 *
 * `GET /ws?token=<jwt>`
 *
 * Each connection runs as a task pair:
 *
 * - a writer task that drains the connection's bounded outbound queue into
 *   the socket
 * - the reader loop (this task) that hands every text frame to the
 *   [`EventDispatcher`]
 *
 * A valid token binds the connection to its user in the presence registry
 * for as long as the socket is open. The upgrade is accepted even without a
 * valid token; such a connection just never gets bound, and its events are
 * ignored.
 *
 * On disconnect the binding is removed by handle, so a connection that was
 * already superseded leaves the newer binding alone.
 */

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::backend::realtime::presence::ConnectionHandle;
use crate::backend::server::state::AppState;
use crate::shared::Identity;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let identity = params.token.as_deref().and_then(|token| {
        match state.sessions.verify_token(token) {
            Ok(claims) => Some(claims.identity()),
            Err(e) => {
                tracing::debug!("[Realtime] Upgrade with unusable token: {}", e);
                None
            }
        }
    });

    ws.on_upgrade(move |socket| run_connection(socket, state, identity))
}

async fn run_connection(socket: WebSocket, state: AppState, identity: Option<Identity>) {
    let (handle, mut outbound) = ConnectionHandle::channel(state.config.outbound_buffer);
    let (mut sender, mut receiver) = socket.split();

    match &identity {
        Some(identity) => {
            state.presence.register(identity.user_id, handle.clone());
            tracing::info!(
                "[Realtime] {} ({}) connected on {} ({} online)",
                identity.username,
                identity.user_id,
                handle.id(),
                state.presence.online_count()
            );
        }
        None => tracing::info!("[Realtime] Unauthenticated connection {}", handle.id()),
    }

    let mut writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to serialize {}: {}", event.event_type.as_str(), e);
                    continue;
                }
            };
            if sender.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    state
                        .dispatcher
                        .handle_frame(identity.as_ref(), &handle, text.as_str())
                        .await;
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                // Binary, ping and pong frames carry nothing for us
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Realtime] Read error on {}: {}", handle.id(), e);
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    if let Some(user_id) = state.presence.unregister(&handle) {
        tracing::info!(
            "[Realtime] User {} disconnected from {} ({} online)",
            user_id,
            handle.id(),
            state.presence.online_count()
        );
    } else {
        tracing::debug!("[Realtime] Connection {} closed", handle.id());
    }

    writer.abort();
}
