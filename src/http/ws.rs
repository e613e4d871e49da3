use super::state::AppState;
use crate::registry::ClientChannel;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tracing::{debug, info, warn};

/// GET /ws/:session_id
/// Duplex client channel for a session. Transcript events relayed by the
/// bridge are pushed out; inbound messages are only read to detect
/// disconnection.
pub async fn client_channel(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_channel(socket, session_id, state))
}

async fn run_channel(mut socket: WebSocket, session_id: String, state: AppState) {
    let (channel, mut events) = ClientChannel::new();
    // Last registration wins: a reconnecting client replaces the old channel.
    state.registry.register(&session_id, channel.clone());
    info!("[{}] client channel connected", session_id);

    loop {
        tokio::select! {
            event = events.recv() => {
                // The sender half lives in the registry entry we just
                // installed, so this only ends with the connection.
                let Some(event) = event else { break };
                let payload = match serde_json::to_string(&event) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("[{}] failed to serialize transcript event: {}", session_id, e);
                        continue;
                    }
                };
                if let Err(e) = socket.send(Message::Text(payload)).await {
                    info!("[{}] client channel send failed: {}", session_id, e);
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        debug!("[{}] received from client: {}", session_id, text);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("[{}] client channel disconnected", session_id);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        info!("[{}] client channel error: {}", session_id, e);
                        break;
                    }
                }
            }
        }
    }

    // Identity-guarded: if a newer client already replaced us, leave its
    // registration alone.
    state.registry.deregister(&session_id, &channel);
    info!("[{}] client channel cleaned up", session_id);
}
