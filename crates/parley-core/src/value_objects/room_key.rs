//! Room key - identifies a broadcast group on the gateway
//!
//! A room is derived 1:1 from a guild, channel, or user id. Snowflakes are
//! globally unique across entity kinds, so the ids alone could never collide,
//! but the key still carries the kind explicitly so that future room kinds
//! cannot alias an existing one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// A logical broadcast group on the real-time gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RoomKey {
    /// The room every member of a guild shares
    Guild(Snowflake),
    /// One room per channel (public, private, or DM)
    Channel(Snowflake),
    /// A user's personal inbox room (friend events, DM notifications)
    User(Snowflake),
}

impl RoomKey {
    /// The id the key was derived from
    #[inline]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Guild(id) | Self::Channel(id) | Self::User(id) => *id,
        }
    }

    /// Short tag for the room kind, used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Guild(_) => "guild",
            Self::Channel(_) => "channel",
            Self::User(_) => "user",
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}
