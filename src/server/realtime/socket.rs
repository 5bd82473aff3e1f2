//! Per-connection WebSocket message loop.
//!
//! Each upgraded socket gets two tasks: one forwarding registry messages to
//! the transport, one reading inbound frames and dispatching them against the
//! registry. When either side finishes the other is aborted and the
//! connection is unregistered. Closing a socket cancels nothing beyond this
//! cleanup; in-flight ticket operations always run to completion.

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::{
    model::realtime::{ClientMessage, ServerMessage},
    server::realtime::{event_room, registry::ConnectionRegistry},
};

use super::registry::ConnectionId;

/// Runs the message loop for one accepted WebSocket connection.
///
/// Registers the connection (indexed under `user_id` when the session was
/// authenticated), greets the client with `connection_established`, then
/// processes frames until the client disconnects or the transport errors.
pub async fn run(socket: WebSocket, registry: ConnectionRegistry, user_id: Option<i32>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = registry.register(tx, user_id).await;

    tracing::info!(
        "WebSocket connected: {} (user: {:?})",
        connection_id,
        user_id
    );

    let (mut sender, mut receiver) = socket.split();

    // Forward registry messages to the transport. The registry hands us
    // everything through the unbounded channel, so the only await point
    // touching the network is here, outside any registry lock.
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(text.into())).await.is_err() {
                // Client disconnected
                break;
            }
        }
    });

    registry
        .send_to_connection(
            connection_id,
            ServerMessage::ConnectionEstablished {
                connection_id,
                user_id,
                timestamp: Utc::now(),
            },
        )
        .await;

    let recv_registry = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_message) => {
                        handle_message(&recv_registry, connection_id, user_id, client_message)
                            .await;
                    }
                    Err(_) => {
                        recv_registry
                            .send_to_connection(
                                connection_id,
                                ServerMessage::Error {
                                    message: "Unrecognized message type".to_string(),
                                    timestamp: Utc::now(),
                                },
                            )
                            .await;
                    }
                },
                Message::Close(_) => break,
                // Axum answers transport pings automatically
                _ => {}
            }
        }
    });

    // Whichever task finishes first tears the other down
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    registry.unregister(connection_id).await;
    tracing::info!("WebSocket disconnected: {}", connection_id);
}

/// Dispatches one parsed client frame.
///
/// Event subscriptions require an authenticated session; plain room joins do
/// not, matching the public nature of per-event dashboards versus personal
/// update streams.
async fn handle_message(
    registry: &ConnectionRegistry,
    connection_id: ConnectionId,
    user_id: Option<i32>,
    message: ClientMessage,
) {
    let timestamp = Utc::now();

    match message {
        ClientMessage::Ping => {
            registry
                .send_to_connection(connection_id, ServerMessage::Pong { timestamp })
                .await;
        }
        ClientMessage::JoinRoom { room_id } => {
            if registry.join_room(connection_id, &room_id).await {
                registry
                    .send_to_connection(connection_id, ServerMessage::RoomJoined { room_id, timestamp })
                    .await;
            }
        }
        ClientMessage::LeaveRoom { room_id } => {
            registry.leave_room(connection_id, &room_id).await;
            registry
                .send_to_connection(connection_id, ServerMessage::RoomLeft { room_id, timestamp })
                .await;
        }
        ClientMessage::SubscribeEvent { event_id } => {
            if user_id.is_none() {
                registry
                    .send_to_connection(
                        connection_id,
                        ServerMessage::Error {
                            message: "Authentication required to subscribe".to_string(),
                            timestamp,
                        },
                    )
                    .await;
                return;
            }

            if registry
                .join_room(connection_id, &event_room(event_id))
                .await
            {
                registry
                    .send_to_connection(
                        connection_id,
                        ServerMessage::EventSubscribed {
                            event_id,
                            timestamp,
                        },
                    )
                    .await;
            }
        }
        ClientMessage::UnsubscribeEvent { event_id } => {
            registry
                .leave_room(connection_id, &event_room(event_id))
                .await;
            registry
                .send_to_connection(
                    connection_id,
                    ServerMessage::EventUnsubscribed {
                        event_id,
                        timestamp,
                    },
                )
                .await;
        }
    }
}
