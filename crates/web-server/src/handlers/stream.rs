use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use events::{LogLevel, LogMessage, StreamMessage};
use futures_util::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// # GET /ws
/// Live feed of committed protocol events.
pub async fn websocket_handler(
    State(state): State<Arc<AppState>>, // State must come before WebSocketUpgrade
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    tracing::info!("[WS] New client connected.");
    // Subscribe before greeting so nothing committed in between is missed.
    let mut events = state.engine.subscribe();
    let (mut sender, mut receiver) = socket.split();

    if !send(&mut sender, &StreamMessage::Connected).await {
        return;
    }

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(envelope) => {
                    if !send(&mut sender, &StreamMessage::Event(envelope)).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "[WS] Client lagged behind the event stream.");
                    let notice = StreamMessage::Log(LogMessage {
                        timestamp: Utc::now(),
                        level: LogLevel::Warn,
                        message: format!("{} events were dropped; fetch /api/events to resync", skipped),
                    });
                    if !send(&mut sender, &notice).await {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("[WS] Client disconnected.");
                    break;
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "[WS] Error.");
                    break;
                }
                // Clients have nothing to say; pings are answered by axum.
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::info!("[WS] Connection closed.");
}

/// Returns false once the client is gone.
async fn send(sender: &mut SplitSink<WebSocket, Message>, message: &StreamMessage) -> bool {
    match message.to_json() {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "[WS] Failed to serialize stream message.");
            true
        }
    }
}
