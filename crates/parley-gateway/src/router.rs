//! Event router
//!
//! Dispatches parsed client frames to the right handler. Every join-like
//! frame is authorized against the room directory before any state changes;
//! denied or nonsensical frames are dropped without a reply, so probing the
//! gateway reveals nothing about rooms the user cannot see.

use crate::directory::RoomDirectory;
use crate::presence::PresencePublisher;
use crate::protocol::{ClientFrame, ServerEvent};
use crate::registry::{Connection, ConnectionRegistry};
use crate::voice::VoiceRelay;
use parley_core::RoomKey;
use std::sync::Arc;

/// Routes inbound frames to handlers
pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
    directory: Arc<RoomDirectory>,
    voice: Arc<VoiceRelay>,
    presence: Arc<PresencePublisher>,
}

impl EventRouter {
    /// Create a new router
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        directory: Arc<RoomDirectory>,
        voice: Arc<VoiceRelay>,
        presence: Arc<PresencePublisher>,
    ) -> Self {
        Self {
            registry,
            directory,
            voice,
            presence,
        }
    }

    /// Handle one frame from a connection
    pub async fn dispatch(&self, connection: &Arc<Connection>, frame: ClientFrame) {
        tracing::trace!(
            connection_id = %connection.id(),
            frame = frame.name(),
            "Dispatching frame"
        );

        // A frame can race with teardown. Once the connection has been
        // removed from the registry, nothing is left to reap state it
        // mutates, so its remaining frames are dropped.
        if self.registry.get(connection.id()).is_none() {
            tracing::debug!(
                connection_id = %connection.id(),
                frame = frame.name(),
                "Dropping frame from removed connection"
            );
            return;
        }

        match frame {
            ClientFrame::JoinChannel { channel_id } => {
                let room = RoomKey::Channel(channel_id);
                if self
                    .directory
                    .can_join_channel_room(connection.user_id(), channel_id)
                    .await
                {
                    self.registry.join(connection.id(), room);
                } else {
                    self.log_denied(connection, &room);
                }
            }

            ClientFrame::JoinGuild { guild_id } => {
                let room = RoomKey::Guild(guild_id);
                if self
                    .directory
                    .can_join_guild_room(connection.user_id(), guild_id)
                    .await
                {
                    self.registry.join(connection.id(), room);
                } else {
                    self.log_denied(connection, &room);
                }
            }

            // Leaving is always permitted, membership or not
            ClientFrame::LeaveRoom { room } => {
                self.registry.leave(connection.id(), &room);
            }

            ClientFrame::StartTyping { room } => {
                self.broadcast_typing(connection, &room, ServerEvent::add_to_typing(connection.username()))
                    .await;
            }

            ClientFrame::StopTyping { room } => {
                self.broadcast_typing(
                    connection,
                    &room,
                    ServerEvent::remove_from_typing(connection.username()),
                )
                .await;
            }

            ClientFrame::ToggleOnline => {
                self.presence.publish(connection.user_id(), true).await;
            }

            ClientFrame::ToggleOffline => {
                self.presence.publish(connection.user_id(), false).await;
            }

            ClientFrame::JoinVoice { guild_id } => {
                if self
                    .directory
                    .can_join_guild_room(connection.user_id(), guild_id)
                    .await
                {
                    self.voice.join(connection.user_id(), guild_id).await;
                } else {
                    self.log_denied(connection, &RoomKey::Guild(guild_id));
                }
            }

            ClientFrame::LeaveVoice { guild_id } => {
                self.voice.leave(connection.user_id(), guild_id).await;
            }

            ClientFrame::VoiceSignal {
                guild_id,
                target_user_id,
                payload,
            } => {
                self.voice
                    .relay(connection.user_id(), guild_id, target_user_id, payload)
                    .await;
            }

            ClientFrame::Heartbeat => {
                connection.record_heartbeat();
                if connection.send(ServerEvent::heartbeat_ack()).await.is_err() {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        "Heartbeat ack not delivered, connection closing"
                    );
                }
            }
        }
    }

    /// Typing events require the sender to have actually joined the room
    ///
    /// Checked against the live registry, not the store: a join that was
    /// denied or never sent means the typing frame is dropped.
    async fn broadcast_typing(
        &self,
        connection: &Arc<Connection>,
        room: &RoomKey,
        event: ServerEvent,
    ) {
        if !connection.in_room(room) {
            tracing::debug!(
                connection_id = %connection.id(),
                room = %room,
                "Dropping typing event from non-member"
            );
            return;
        }

        self.registry
            .broadcast(room, event, Some(connection.id()))
            .await;
    }

    fn log_denied(&self, connection: &Arc<Connection>, room: &RoomKey) {
        tracing::debug!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            room = %room,
            "Join denied"
        );
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter").finish()
    }
}
