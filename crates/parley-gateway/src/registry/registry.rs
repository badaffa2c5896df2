//! Room-keyed connection registry
//!
//! The registry is the single source of truth for which connections exist and
//! which rooms each has joined. All maps are `DashMap`s so handlers on
//! different connections never contend on a global lock.

use super::Connection;
use crate::protocol::ServerEvent;
use dashmap::DashMap;
use parley_core::{RoomKey, Snowflake};
use std::collections::HashSet;
use std::sync::Arc;

/// Registry of live connections and their room subscriptions
pub struct ConnectionRegistry {
    /// Active connections by connection ID
    connections: DashMap<String, Arc<Connection>>,

    /// Room to connection IDs mapping
    rooms: DashMap<RoomKey, HashSet<String>>,

    /// User ID to connection IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
            user_connections: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection
    pub fn register(&self, connection: Arc<Connection>) {
        self.user_connections
            .entry(connection.user_id())
            .or_default()
            .insert(connection.id().to_string());

        self.connections
            .insert(connection.id().to_string(), connection.clone());

        tracing::debug!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            "Connection registered"
        );
    }

    /// Subscribe a connection to a room
    ///
    /// Idempotent: joining a room twice is a no-op. Returns false when the
    /// connection is unknown.
    pub fn join(&self, connection_id: &str, room: RoomKey) -> bool {
        let Some(connection) = self.get(connection_id) else {
            return false;
        };

        connection.track_room(room);
        self.rooms
            .entry(room)
            .or_default()
            .insert(connection_id.to_string());

        tracing::trace!(
            connection_id = %connection_id,
            room = %room,
            "Connection joined room"
        );

        true
    }

    /// Unsubscribe a connection from a room
    ///
    /// Idempotent: leaving a room the connection never joined is a no-op.
    /// Uses `alter`/`remove_if` for atomic modify-and-cleanup; only the
    /// touched room is inspected, never the whole map.
    pub fn leave(&self, connection_id: &str, room: &RoomKey) -> bool {
        let Some(connection) = self.get(connection_id) else {
            return false;
        };

        connection.untrack_room(room);

        self.rooms.alter(room, |_, mut members| {
            members.remove(connection_id);
            members
        });
        self.rooms.remove_if(room, |_, members| members.is_empty());

        tracing::trace!(
            connection_id = %connection_id,
            room = %room,
            "Connection left room"
        );

        true
    }

    /// Remove a connection entirely, detaching it from every room
    ///
    /// Returns the removed connection so the caller can finish cleanup
    /// (presence, voice roster) with its identity.
    pub fn remove(&self, connection_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(connection_id)?;

        for room in connection.rooms() {
            self.rooms.alter(&room, |_, mut members| {
                members.remove(connection_id);
                members
            });
            self.rooms.remove_if(&room, |_, members| members.is_empty());
        }

        self.user_connections
            .alter(&connection.user_id(), |_, mut ids| {
                ids.remove(connection_id);
                ids
            });
        self.user_connections
            .remove_if(&connection.user_id(), |_, ids| ids.is_empty());

        tracing::debug!(
            connection_id = %connection_id,
            user_id = %connection.user_id(),
            "Connection removed"
        );

        Some(connection)
    }

    /// Get a connection by ID
    #[must_use]
    pub fn get(&self, connection_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(connection_id).map(|r| r.clone())
    }

    /// All connections currently joined to a room
    #[must_use]
    pub fn connections_in_room(&self, room: &RoomKey) -> Vec<Arc<Connection>> {
        self.rooms
            .get(room)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All connections for a user
    #[must_use]
    pub fn connections_for_user(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deliver an event to every connection in a room
    ///
    /// `exclude` skips the originating connection (typing events). Delivery is
    /// fire-and-forget: a connection whose write task has gone away is simply
    /// skipped. Returns the number of connections the event was queued for.
    pub async fn broadcast(
        &self,
        room: &RoomKey,
        event: ServerEvent,
        exclude: Option<&str>,
    ) -> usize {
        let connections = self.connections_in_room(room);
        let mut sent = 0;

        for conn in connections {
            if exclude == Some(conn.id()) {
                continue;
            }
            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::trace!(room = %room, event = %event.t, sent = sent, "Broadcast to room");

        sent
    }

    /// Deliver an event to every connection of one user
    pub async fn send_to_user(&self, user_id: Snowflake, event: ServerEvent) -> usize {
        let connections = self.connections_for_user(user_id);
        let mut sent = 0;

        for conn in connections {
            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::trace!(user_id = %user_id, event = %event.t, sent = sent, "Sent to user");

        sent
    }

    /// Number of live connections for a user
    #[must_use]
    pub fn user_connection_count(&self, user_id: Snowflake) -> usize {
        self.user_connections
            .get(&user_id)
            .map_or(0, |ids| ids.len())
    }

    /// Total number of active connections
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of rooms with at least one member
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("rooms", &self.rooms.len())
            .field("users", &self.user_connections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn add_connection(
        registry: &ConnectionRegistry,
        id: &str,
        user_id: i64,
        username: &str,
    ) -> (Arc<Connection>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let conn = Connection::new(
            id.to_string(),
            Snowflake::new(user_id),
            username.to_string(),
            tx,
        );
        registry.register(conn.clone());
        (conn, rx)
    }

    #[tokio::test]
    async fn test_register_and_remove() {
        let registry = ConnectionRegistry::new();
        let (_conn, _rx) = add_connection(&registry, "c1", 1, "alice");

        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.user_connection_count(Snowflake::new(1)), 1);

        let removed = registry.remove("c1").unwrap();
        assert_eq!(removed.id(), "c1");
        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.user_connection_count(Snowflake::new(1)), 0);
        assert!(registry.remove("c1").is_none());
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (_conn, mut rx) = add_connection(&registry, "c1", 1, "alice");
        let room = RoomKey::Channel(Snowflake::new(5));

        assert!(registry.join("c1", room));
        assert!(registry.join("c1", room));
        assert_eq!(registry.connections_in_room(&room).len(), 1);

        // A single broadcast reaches the connection exactly once
        registry.broadcast(&room, ServerEvent::heartbeat_ack(), None).await;
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (_conn, _rx) = add_connection(&registry, "c1", 1, "alice");
        let room = RoomKey::Guild(Snowflake::new(7));

        registry.join("c1", room);
        assert!(registry.leave("c1", &room));
        assert!(registry.leave("c1", &room));
        assert!(registry.connections_in_room(&room).is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_leave_drops_only_the_emptied_room() {
        let registry = ConnectionRegistry::new();
        let (_a, _rx_a) = add_connection(&registry, "a", 1, "alice");
        let (_b, _rx_b) = add_connection(&registry, "b", 2, "bob");
        let shared = RoomKey::Channel(Snowflake::new(1));
        let solo = RoomKey::Channel(Snowflake::new(2));

        registry.join("a", shared);
        registry.join("b", shared);
        registry.join("a", solo);

        // Emptying one room leaves every other room untouched
        registry.leave("a", &solo);
        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.connections_in_room(&shared).len(), 2);

        // A room that still has members survives a leave
        registry.leave("a", &shared);
        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.connections_in_room(&shared).len(), 1);
    }

    #[tokio::test]
    async fn test_join_unknown_connection_fails() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.join("ghost", RoomKey::Guild(Snowflake::new(1))));
        assert!(!registry.leave("ghost", &RoomKey::Guild(Snowflake::new(1))));
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = add_connection(&registry, "a", 1, "alice");
        let (_b, mut rx_b) = add_connection(&registry, "b", 2, "bob");
        let room = RoomKey::Channel(Snowflake::new(9));

        registry.join("a", room);
        registry.join("b", room);

        let sent = registry
            .broadcast(&room, ServerEvent::add_to_typing("alice"), Some("a"))
            .await;

        assert_eq!(sent, 1);
        assert_eq!(rx_b.recv().await.unwrap(), ServerEvent::add_to_typing("alice"));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_other_rooms() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = add_connection(&registry, "a", 1, "alice");
        let (_b, mut rx_b) = add_connection(&registry, "b", 2, "bob");

        registry.join("a", RoomKey::Channel(Snowflake::new(1)));
        registry.join("b", RoomKey::Channel(Snowflake::new(2)));

        let sent = registry
            .broadcast(
                &RoomKey::Channel(Snowflake::new(1)),
                ServerEvent::heartbeat_ack(),
                None,
            )
            .await;

        assert_eq!(sent, 1);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_user_reaches_all_their_connections() {
        let registry = ConnectionRegistry::new();
        let (_a1, mut rx1) = add_connection(&registry, "a1", 1, "alice");
        let (_a2, mut rx2) = add_connection(&registry, "a2", 1, "alice");
        let (_b, mut rx_b) = add_connection(&registry, "b", 2, "bob");

        let sent = registry
            .send_to_user(Snowflake::new(1), ServerEvent::heartbeat_ack())
            .await;

        assert_eq!(sent, 2);
        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_remove_detaches_from_all_rooms() {
        let registry = ConnectionRegistry::new();
        let (_a, _rx_a) = add_connection(&registry, "a", 1, "alice");
        let guild = RoomKey::Guild(Snowflake::new(1));
        let channel = RoomKey::Channel(Snowflake::new(2));

        registry.join("a", guild);
        registry.join("a", channel);
        registry.remove("a");

        assert!(registry.connections_in_room(&guild).is_empty());
        assert!(registry.connections_in_room(&channel).is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_after_remove_delivers_nothing() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = add_connection(&registry, "a", 1, "alice");
        let room = RoomKey::Guild(Snowflake::new(3));

        registry.join("a", room);
        registry.remove("a");

        let sent = registry
            .broadcast(&room, ServerEvent::heartbeat_ack(), None)
            .await;
        assert_eq!(sent, 0);
        assert!(rx_a.try_recv().is_err());
    }
}
