use crate::common::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, interval};
use tracing::debug;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Deserialize)]
pub struct ConnectArgs {
    /// Verified by the upstream gateway before the upgrade reaches us.
    pub user_id: i64,
}

/// `GET /api/v1/ws?user_id=` — joins the caller's per-user broadcast group.
/// Pushed events are fire-and-forget; there is no acknowledgment protocol.
pub async fn controller(
    State(state): State<AppState>,
    Query(args): Query<ConnectArgs>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, args.user_id, socket))
}

/// Pumps dispatcher events out to the socket and watches liveness. Every
/// exit path runs through the single unregister below, so neither a normal
/// close, a heartbeat timeout nor an abrupt network loss can leak a
/// presence entry.
async fn handle_socket(state: AppState, user_id: i64, socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let channel_id = state.presence.register(user_id, tx);
    debug!(user_id, %channel_id, "Channel opened");

    let (mut sink, mut stream) = socket.split();
    let mut heartbeat = interval(HEARTBEAT_INTERVAL);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let Ok(payload) = serde_json::to_string(&event) else { continue };
                if sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => last_seen = Instant::now(),
                }
            }
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    debug!(user_id, %channel_id, "Channel timed out");
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.presence.unregister(user_id, channel_id);
    debug!(user_id, %channel_id, "Channel closed");
}
