//! Domain event emission
//!
//! [`GatewayHandle`] is the facade REST-side domain services hold to announce
//! their mutations: after a successful write they call the matching emitter
//! and every connection in the relevant room hears about it. The handle is
//! injected where those services are constructed; nothing here is global.
//!
//! Emission is fire-and-forget. Payloads are the plain serialized domain
//! objects; the gateway does not reshape them.

use crate::protocol::{event, ServerEvent};
use crate::registry::ConnectionRegistry;
use parley_core::{RoomKey, Snowflake};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Broadcast facade handed to domain services
#[derive(Clone)]
pub struct GatewayHandle {
    registry: Arc<ConnectionRegistry>,
}

impl GatewayHandle {
    /// Create a handle over the registry
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// A channel was created; announce to the guild
    pub async fn channel_created<T: Serialize>(&self, guild_id: Snowflake, channel: &T) {
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::from_payload(event::ADD_CHANNEL, channel),
        )
        .await;
    }

    /// A channel was edited; announce to the guild
    pub async fn channel_updated<T: Serialize>(&self, guild_id: Snowflake, channel: &T) {
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::from_payload(event::EDIT_CHANNEL, channel),
        )
        .await;
    }

    /// A channel was deleted; announce to the guild
    pub async fn channel_deleted(&self, guild_id: Snowflake, channel_id: Snowflake) {
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::new(event::DELETE_CHANNEL, Value::String(channel_id.to_string())),
        )
        .await;
    }

    /// A member joined the guild
    pub async fn member_added<T: Serialize>(&self, guild_id: Snowflake, member: &T) {
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::from_payload(event::ADD_MEMBER, member),
        )
        .await;
    }

    /// A member was removed from the guild (left, kicked, or banned)
    pub async fn member_removed(&self, guild_id: Snowflake, user_id: Snowflake) {
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::new(event::REMOVE_MEMBER, Value::String(user_id.to_string())),
        )
        .await;
    }

    /// A message was created
    ///
    /// The message goes to the channel room; the owning guild also gets a
    /// `push_to_top` nudge so sidebars reorder without the full payload.
    pub async fn message_created<T: Serialize>(
        &self,
        channel_id: Snowflake,
        guild_id: Snowflake,
        message: &T,
    ) {
        self.emit(
            &RoomKey::Channel(channel_id),
            ServerEvent::from_payload(event::NEW_MESSAGE, message),
        )
        .await;
        self.emit(
            &RoomKey::Guild(guild_id),
            ServerEvent::new(event::PUSH_TO_TOP, Value::String(channel_id.to_string())),
        )
        .await;
    }

    /// A message was edited; announce to the channel
    pub async fn message_updated<T: Serialize>(&self, channel_id: Snowflake, message: &T) {
        self.emit(
            &RoomKey::Channel(channel_id),
            ServerEvent::from_payload(event::EDIT_MESSAGE, message),
        )
        .await;
    }

    /// A message was deleted; announce to the channel
    pub async fn message_deleted(&self, channel_id: Snowflake, message_id: Snowflake) {
        self.emit(
            &RoomKey::Channel(channel_id),
            ServerEvent::new(event::DELETE_MESSAGE, Value::String(message_id.to_string())),
        )
        .await;
    }

    /// Deliver an arbitrary named event to one user's inbox room
    ///
    /// Used for friend request lifecycle events, which address a user rather
    /// than a guild or channel.
    pub async fn notify_user<T: Serialize>(&self, user_id: Snowflake, name: &str, payload: &T) {
        self.emit(
            &RoomKey::User(user_id),
            ServerEvent::from_payload(name, payload),
        )
        .await;
    }

    /// Deliver an arbitrary named event to any room
    pub async fn broadcast<T: Serialize>(&self, room: &RoomKey, name: &str, payload: &T) {
        self.emit(room, ServerEvent::from_payload(name, payload)).await;
    }

    async fn emit(&self, room: &RoomKey, event: ServerEvent) {
        let sent = self.registry.broadcast(room, event, None).await;
        tracing::trace!(room = %room, sent = sent, "Domain event emitted");
    }
}

impl std::fmt::Debug for GatewayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayHandle").finish()
    }
}
