use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{interval_at, timeout, Instant};
use tracing::{debug, info, warn};

use crate::relay::Frame;
use crate::state::AppState;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let max_message_size = state.config.max_message_size;
    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(data) => Message::Binary(data),
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (connection_id, mut rx) = state.relay.register().await;
    let peers = state.relay.peer_count().await;
    info!(
        conn = %connection_id,
        peers = peers,
        "channel opened"
    );

    let ping_interval = state.config.ping_interval;
    let write_timeout = state.config.write_timeout;
    let mut send_task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + ping_interval, ping_interval);
        loop {
            let message = tokio::select! {
                frame = rx.recv() => match frame {
                    Some(frame) => Message::from(frame),
                    None => {
                        // Evicted or unregistered: say goodbye and stop writing.
                        let _ = timeout(write_timeout, socket_sender.send(Message::Close(None))).await;
                        break;
                    }
                },
                _ = ticker.tick() => Message::Ping(Vec::new()),
            };
            match timeout(write_timeout, socket_sender.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    debug!(conn = %connection_id, %error, "write failed");
                    break;
                }
                Err(_) => {
                    warn!(conn = %connection_id, "write timed out");
                    break;
                }
            }
        }
    });

    let relay = state.relay.clone();
    let pong_timeout = state.config.pong_timeout;
    let mut recv_task = tokio::spawn(async move {
        loop {
            let next = match timeout(pong_timeout, socket_receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(conn = %connection_id, "no traffic before pong timeout");
                    break;
                }
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    relay
                        .broadcast_except(connection_id, Frame::Text(text))
                        .await;
                }
                Some(Ok(Message::Binary(data))) => {
                    relay
                        .broadcast_except(connection_id, Frame::Binary(data))
                        .await;
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        debug!(
                            conn = %connection_id,
                            code = frame.code,
                            reason = %frame.reason,
                            "close frame"
                        );
                    }
                    break;
                }
                // Pings are answered by the websocket layer; both only keep the read deadline alive.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Err(error)) => {
                    debug!(conn = %connection_id, %error, "read failed");
                    break;
                }
                None => break,
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.relay.unregister(connection_id).await;
    let peers = state.relay.peer_count().await;
    info!(
        conn = %connection_id,
        peers = peers,
        "channel closed"
    );
}
