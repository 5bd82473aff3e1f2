//! Wire messages for the real-time WebSocket channel.
//!
//! Every frame is a JSON object tagged by a `type` field. Inbound frames
//! deserialize into the closed [`ClientMessage`] enum; anything that does not
//! match a known variant is answered with a `ServerMessage::Error` frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Messages accepted from clients over the WebSocket.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Connection health check; answered with `pong`.
    Ping,
    /// Join a named broadcast room.
    JoinRoom { room_id: String },
    /// Leave a room; a no-op if not a member.
    LeaveRoom { room_id: String },
    /// Subscribe to live updates for one event (joins room `event_<id>`).
    SubscribeEvent { event_id: i32 },
    /// Unsubscribe from an event's updates.
    UnsubscribeEvent { event_id: i32 },
}

/// Messages sent to clients over the WebSocket.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionEstablished {
        connection_id: Uuid,
        user_id: Option<i32>,
        timestamp: DateTime<Utc>,
    },
    Pong {
        timestamp: DateTime<Utc>,
    },
    RoomJoined {
        room_id: String,
        timestamp: DateTime<Utc>,
    },
    RoomLeft {
        room_id: String,
        timestamp: DateTime<Utc>,
    },
    EventSubscribed {
        event_id: i32,
        timestamp: DateTime<Utc>,
    },
    EventUnsubscribed {
        event_id: i32,
        timestamp: DateTime<Utc>,
    },
    EventUpdate {
        event_id: i32,
        update_type: String,
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
    Notification {
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
    Broadcast {
        message: serde_json::Value,
        sender: i32,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Body for the event-update notify endpoint.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct NotifyEventDto {
    pub update_type: String,
    pub data: serde_json::Value,
}

/// Body for the admin realtime broadcast endpoint.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct BroadcastMessageDto {
    pub message: serde_json::Value,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct BroadcastResultDto {
    pub recipients: usize,
}

/// Live connection statistics for the admin endpoint.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct RegistryStatsDto {
    pub total_connections: usize,
    pub authenticated_users: usize,
    pub active_rooms: usize,
    /// Member count per room.
    pub rooms: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_tags_round_trip() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"join_room","room_id":"event_7"}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::JoinRoom {
                room_id: "event_7".to_string()
            }
        );

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe_event","event_id":7}"#).unwrap();
        assert_eq!(parsed, ClientMessage::SubscribeEvent { event_id: 7 });

        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(parsed, ClientMessage::Ping);
    }

    #[test]
    fn unknown_client_message_type_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"send_rockets"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn event_update_serializes_with_type_tag() {
        let msg = ServerMessage::EventUpdate {
            event_id: 3,
            update_type: "ticket_redeemed".to_string(),
            data: serde_json::json!({"sold": 12}),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"event_update""#));
        assert!(json.contains(r#""event_id":3"#));
        assert!(json.contains(r#""update_type":"ticket_redeemed""#));
    }
}
