//! Room directory
//!
//! Answers "may this user join this room?" against the relational store.
//! The directory never mutates anything; room membership writes happen on the
//! REST side. Store errors fail closed: an unanswerable check denies the join.

use parley_core::{ChannelRepository, MemberRepository, RoomKey, Snowflake};
use std::sync::Arc;

/// Authorization oracle for room joins
pub struct RoomDirectory {
    members: Arc<dyn MemberRepository>,
    channels: Arc<dyn ChannelRepository>,
}

impl RoomDirectory {
    /// Create a new directory over the given repositories
    pub fn new(members: Arc<dyn MemberRepository>, channels: Arc<dyn ChannelRepository>) -> Self {
        Self { members, channels }
    }

    /// True iff the user has a membership row for the guild
    pub async fn can_join_guild_room(&self, user_id: Snowflake, guild_id: Snowflake) -> bool {
        match self.members.is_member(guild_id, user_id).await {
            Ok(is_member) => is_member,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    guild_id = %guild_id,
                    error = %e,
                    "Guild membership check failed, denying join"
                );
                false
            }
        }
    }

    /// Authorization for a channel room
    ///
    /// Public channels delegate to the guild membership check; private and DM
    /// channels require an explicit channel membership row. Unknown channels
    /// deny.
    pub async fn can_join_channel_room(&self, user_id: Snowflake, channel_id: Snowflake) -> bool {
        let channel = match self.channels.find_by_id(channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                tracing::debug!(channel_id = %channel_id, "Channel not found, denying join");
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    error = %e,
                    "Channel lookup failed, denying join"
                );
                return false;
            }
        };

        if channel.is_public() {
            return self.can_join_guild_room(user_id, channel.guild_id).await;
        }

        match self.channels.is_channel_member(channel_id, user_id).await {
            Ok(is_member) => is_member,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    error = %e,
                    "Channel membership check failed, denying join"
                );
                false
            }
        }
    }

    /// Authorization for any room key
    ///
    /// A user room admits only its owner; clients are auto-joined to it at
    /// connect time and cannot join someone else's inbox.
    pub async fn can_join(&self, user_id: Snowflake, room: &RoomKey) -> bool {
        match room {
            RoomKey::Guild(guild_id) => self.can_join_guild_room(user_id, *guild_id).await,
            RoomKey::Channel(channel_id) => {
                self.can_join_channel_room(user_id, *channel_id).await
            }
            RoomKey::User(owner_id) => *owner_id == user_id,
        }
    }

    /// All guild ids the user belongs to, for presence fan-out
    ///
    /// Returns an empty list on store failure; the caller logs and skips the
    /// fan-out rather than guessing.
    pub async fn guild_ids_for_user(&self, user_id: Snowflake) -> Vec<Snowflake> {
        match self.members.guild_ids_for_user(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Guild list lookup failed"
                );
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for RoomDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomDirectory").finish()
    }
}
