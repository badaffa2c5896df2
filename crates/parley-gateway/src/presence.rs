//! Presence publisher
//!
//! Persists online/offline flips and fans them out to every guild the user
//! belongs to. One fan-out per toggle, no batching or debouncing; guild
//! membership per user is small enough that O(guild count) is fine.

use crate::directory::RoomDirectory;
use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;
use parley_core::{RoomKey, Snowflake, UserRepository};
use std::sync::Arc;

/// Publishes presence changes to the user's guilds
pub struct PresencePublisher {
    users: Arc<dyn UserRepository>,
    directory: Arc<RoomDirectory>,
    registry: Arc<ConnectionRegistry>,
}

impl PresencePublisher {
    /// Create a new publisher
    pub fn new(
        users: Arc<dyn UserRepository>,
        directory: Arc<RoomDirectory>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            users,
            directory,
            registry,
        }
    }

    /// Persist the user's online flag and broadcast to each of their guilds
    ///
    /// A store write failure is logged but does not suppress the fan-out;
    /// connected peers still learn the live state.
    pub async fn publish(&self, user_id: Snowflake, online: bool) {
        if let Err(e) = self.users.set_online(user_id, online).await {
            tracing::warn!(
                user_id = %user_id,
                online = online,
                error = %e,
                "Failed to persist presence"
            );
        }

        let event = if online {
            ServerEvent::toggle_online(user_id)
        } else {
            ServerEvent::toggle_offline(user_id)
        };

        let guild_ids = self.directory.guild_ids_for_user(user_id).await;
        for guild_id in guild_ids {
            self.registry
                .broadcast(&RoomKey::Guild(guild_id), event.clone(), None)
                .await;
        }

        tracing::debug!(user_id = %user_id, online = online, "Presence published");
    }
}

impl std::fmt::Debug for PresencePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresencePublisher").finish()
    }
}
