//! A single WebSocket connection
//!
//! Identity (user id, username) is fixed at handshake time, so only the room
//! set and heartbeat clock are mutable.

use crate::protocol::ServerEvent;
use parking_lot::RwLock;
use parley_core::{RoomKey, Snowflake};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// State for one live connection
pub struct Connection {
    /// Unique connection ID (UUID)
    id: String,

    /// Authenticated user
    user_id: Snowflake,

    /// Username at connect time, used for typing events
    username: String,

    /// Sender half of the outgoing message channel
    sender: mpsc::Sender<ServerEvent>,

    /// Rooms this connection has joined
    rooms: RwLock<HashSet<RoomKey>>,

    /// Last heartbeat received from the client
    last_heartbeat: RwLock<Instant>,
}

impl Connection {
    /// Create a new connection
    #[must_use]
    pub fn new(
        id: String,
        user_id: Snowflake,
        username: String,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            user_id,
            username,
            sender,
            rooms: RwLock::new(HashSet::new()),
            last_heartbeat: RwLock::new(Instant::now()),
        })
    }

    /// Connection ID
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Authenticated user ID
    #[must_use]
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Username for typing events
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Queue an event for delivery
    ///
    /// Fails when the write task has gone away; callers treat that as a
    /// connection already being torn down.
    pub async fn send(&self, event: ServerEvent) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event).await
    }

    /// True once the write task has dropped its receiver
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Record membership in a room; returns false if already joined
    pub fn track_room(&self, room: RoomKey) -> bool {
        self.rooms.write().insert(room)
    }

    /// Forget membership in a room; returns false if not joined
    pub fn untrack_room(&self, room: &RoomKey) -> bool {
        self.rooms.write().remove(room)
    }

    /// True if the connection has joined the room
    #[must_use]
    pub fn in_room(&self, room: &RoomKey) -> bool {
        self.rooms.read().contains(room)
    }

    /// Snapshot of joined rooms
    #[must_use]
    pub fn rooms(&self) -> Vec<RoomKey> {
        self.rooms.read().iter().copied().collect()
    }

    /// Record a client heartbeat
    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.write() = Instant::now();
    }

    /// Time elapsed since the last client heartbeat
    #[must_use]
    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.read().elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("rooms", &self.rooms.read().len())
            .finish()
    }
}
