//! In-memory registry of live WebSocket connections.
//!
//! The registry owns three tables: the connection map, an index of
//! connections per authenticated user (one user may be connected from several
//! devices), and named rooms for group delivery. Connections are identified
//! by server-generated UUIDs handed out at registration; clients never supply
//! their own identifiers.
//!
//! Delivery is best-effort and at-most-once: messages for users with no live
//! connection are dropped, and a failed send unregisters the dead connection
//! without interrupting the surrounding fan-out. The registry never performs
//! transport I/O itself; each connection registers an unbounded channel whose
//! receiving end is drained by that connection's socket task, so no lock is
//! ever held across a network write.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::model::realtime::{RegistryStatsDto, ServerMessage};

/// Server-generated identifier of one live connection.
pub type ConnectionId = Uuid;

/// One live transport-level session.
struct Connection {
    /// Outbound channel drained by the connection's socket task.
    sender: mpsc::UnboundedSender<ServerMessage>,
    /// Authenticated user, when the session carried one at upgrade time.
    user_id: Option<i32>,
    connected_at: DateTime<Utc>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, Connection>,
    user_index: HashMap<i32, HashSet<ConnectionId>>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl RegistryInner {
    /// Removes a connection from all three tables.
    ///
    /// Rooms and user-index entries that become empty are dropped entirely;
    /// a room exists only while it has members.
    fn remove(&mut self, connection_id: ConnectionId) -> bool {
        let Some(connection) = self.connections.remove(&connection_id) else {
            return false;
        };

        if let Some(user_id) = connection.user_id {
            if let Some(ids) = self.user_index.get_mut(&user_id) {
                ids.remove(&connection_id);
                if ids.is_empty() {
                    self.user_index.remove(&user_id);
                }
            }
        }

        self.rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });

        tracing::debug!(
            "Connection removed: {} (connected at {})",
            connection_id,
            connection.connected_at
        );

        true
    }
}

/// Registry of live WebSocket connections, shared across request handlers.
///
/// Cheap to clone; all clones share the same tables behind an `Arc<RwLock>`.
/// Every operation takes the lock once for its whole logical step, and
/// fan-out snapshots its targets under the lock before delivering, so a slow
/// client can never stall registry mutations.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
        }
    }

    /// Registers a new connection and returns its server-generated id.
    ///
    /// If `user_id` is given the connection is also indexed under that user,
    /// alongside any other devices the user has connected.
    ///
    /// # Arguments
    /// - `sender` - Outbound channel owned by the connection's socket task
    /// - `user_id` - Authenticated user, if the session carried one
    ///
    /// # Returns
    /// - `ConnectionId` - Unique identifier for the new connection
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
        user_id: Option<i32>,
    ) -> ConnectionId {
        let connection_id = Uuid::new_v4();

        let mut inner = self.inner.write().await;
        inner.connections.insert(
            connection_id,
            Connection {
                sender,
                user_id,
                connected_at: Utc::now(),
            },
        );

        if let Some(user_id) = user_id {
            inner
                .user_index
                .entry(user_id)
                .or_default()
                .insert(connection_id);
        }

        tracing::debug!("Connection registered: {} (user: {:?})", connection_id, user_id);

        connection_id
    }

    /// Removes a connection from the registry and every room it joined.
    ///
    /// Safe to call with an unknown id (no-op). Rooms left empty are deleted.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        self.inner.write().await.remove(connection_id);
    }

    /// Adds a connection to a room, creating the room on first join.
    ///
    /// Joining a room twice is idempotent. Unknown connection ids are
    /// rejected so a stale id cannot create ghost memberships.
    ///
    /// # Returns
    /// - `true` - Connection is (now) a member of the room
    /// - `false` - Unknown connection id; nothing changed
    pub async fn join_room(&self, connection_id: ConnectionId, room_id: &str) -> bool {
        let mut inner = self.inner.write().await;

        if !inner.connections.contains_key(&connection_id) {
            return false;
        }

        inner
            .rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id);

        true
    }

    /// Removes a connection from a room.
    ///
    /// Leaving a room the connection is not in is a no-op. The room is
    /// deleted when its last member leaves.
    pub async fn leave_room(&self, connection_id: ConnectionId, room_id: &str) {
        let mut inner = self.inner.write().await;

        if let Some(members) = inner.rooms.get_mut(room_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                inner.rooms.remove(room_id);
            }
        }
    }

    /// Sends a message to one specific connection.
    ///
    /// # Returns
    /// - `true` - Message was handed to the connection's channel
    /// - `false` - Unknown or dead connection (dead ones are unregistered)
    pub async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: ServerMessage,
    ) -> bool {
        let target = {
            let inner = self.inner.read().await;
            inner
                .connections
                .get(&connection_id)
                .map(|c| c.sender.clone())
        };

        match target {
            Some(sender) => self.deliver(vec![(connection_id, sender)], &message).await == 1,
            None => false,
        }
    }

    /// Sends a message to every live connection of one user.
    ///
    /// Silently succeeds with zero deliveries when the user has no live
    /// connection; messages are not queued for offline users.
    ///
    /// # Returns
    /// - Number of connections the message was delivered to
    pub async fn send_to_user(&self, user_id: i32, message: ServerMessage) -> usize {
        let targets = {
            let inner = self.inner.read().await;
            inner
                .user_index
                .get(&user_id)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| {
                            inner.connections.get(id).map(|c| (*id, c.sender.clone()))
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        self.deliver(targets, &message).await
    }

    /// Sends a message to every member of a room.
    ///
    /// Best-effort per member: a dead member is unregistered and skipped
    /// without affecting delivery to the others.
    ///
    /// # Returns
    /// - Number of connections the message was delivered to
    pub async fn send_to_room(&self, room_id: &str, message: ServerMessage) -> usize {
        let targets = {
            let inner = self.inner.read().await;
            inner
                .rooms
                .get(room_id)
                .map(|members| {
                    members
                        .iter()
                        .filter_map(|id| {
                            inner.connections.get(id).map(|c| (*id, c.sender.clone()))
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        self.deliver(targets, &message).await
    }

    /// Sends a message to every registered connection.
    ///
    /// # Returns
    /// - Number of connections the message was delivered to
    pub async fn broadcast(&self, message: ServerMessage) -> usize {
        let targets = {
            let inner = self.inner.read().await;
            inner
                .connections
                .iter()
                .map(|(id, c)| (*id, c.sender.clone()))
                .collect::<Vec<_>>()
        };

        self.deliver(targets, &message).await
    }

    /// Returns live connection statistics.
    pub async fn stats(&self) -> RegistryStatsDto {
        let inner = self.inner.read().await;

        RegistryStatsDto {
            total_connections: inner.connections.len(),
            authenticated_users: inner.user_index.len(),
            active_rooms: inner.rooms.len(),
            rooms: inner
                .rooms
                .iter()
                .map(|(room_id, members)| (room_id.clone(), members.len()))
                .collect(),
        }
    }

    /// Age of a connection, for diagnostics.
    #[cfg(test)]
    pub async fn connected_at(&self, connection_id: ConnectionId) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&connection_id)
            .map(|c| c.connected_at)
    }

    /// Delivers a message to the snapshotted targets.
    ///
    /// Runs entirely outside the registry lock. A send only fails when the
    /// receiving socket task has dropped its channel, which means the
    /// connection is gone; such connections are unregistered here so later
    /// fan-outs no longer see them.
    async fn deliver(
        &self,
        targets: Vec<(ConnectionId, mpsc::UnboundedSender<ServerMessage>)>,
        message: &ServerMessage,
    ) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (connection_id, sender) in targets {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!("Failed to send to connection {}, dropping it", connection_id);
                dead.push(connection_id);
            }
        }

        if !dead.is_empty() {
            let mut inner = self.inner.write().await;
            for connection_id in dead {
                inner.remove(connection_id);
            }
        }

        delivered
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
