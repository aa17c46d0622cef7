//! WebSocket Handler
//!
//! Upgrades `/ws` requests and runs each dashboard connection until either
//! side closes it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.ws_hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection.
///
/// One loop serves both directions: hub notifications queued for this
/// connection go out, client frames come in. Either side closing ends it.
async fn handle_socket(mut socket: WebSocket, hub: Arc<ConnectionHub>) {
    let (outbox, mut queued) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(outbox).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting WebSocket connection");
            send_json(&mut socket, &ServerMessage::Error { message: e.to_string() }).await;
            return;
        }
    };

    let welcome = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    let mut open = send_json(&mut socket, &welcome).await;

    while open {
        open = tokio::select! {
            outgoing = queued.recv() => match outgoing {
                Some(message) => send_json(&mut socket, &message).await,
                None => false,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(frame)) => handle_ws_message(&hub, &connection_id, frame).await,
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                    false
                }
                None => false,
            },
        };
    }

    hub.unregister(&connection_id).await;
}

async fn send_json(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            false
        }
    }
}

/// Returns false if the connection should be closed.
async fn handle_ws_message(hub: &ConnectionHub, connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_client_message(hub, connection_id, client_msg).await,
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Invalid client message"
                    );
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_msg).await;
            true
        }
        // axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

async fn handle_client_message(hub: &ConnectionHub, connection_id: &str, message: ClientMessage) {
    let response = match message {
        ClientMessage::Subscribe { topics } => hub
            .subscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Subscribed { topics }),
        ClientMessage::Unsubscribe { topics } => hub
            .unsubscribe(connection_id, topics)
            .await
            .map(|topics| ServerMessage::Unsubscribed { topics }),
        ClientMessage::Ping => Ok(ServerMessage::Pong),
    };

    let response = response.unwrap_or_else(|e| {
        tracing::error!(connection_id = %connection_id, error = %e, "Subscription error");
        ServerMessage::Error {
            message: e.to_string(),
        }
    });
    let _ = hub.send_to(connection_id, response).await;
}
