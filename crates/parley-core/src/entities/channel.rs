//! Channel entity - a public, private, or direct-message channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel access kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ChannelKind {
    /// Visible to every guild member
    #[default]
    Public = 0,
    /// Restricted to an explicit allow-list of members
    Private = 1,
    /// Direct message between exactly two users
    Dm = 2,
}

impl ChannelKind {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl From<i16> for ChannelKind {
    fn from(value: i16) -> Self {
        match value {
            1 => Self::Private,
            2 => Self::Dm,
            _ => Self::Public, // Default for 0 and unknown values
        }
    }
}

impl From<ChannelKind> for i16 {
    fn from(kind: ChannelKind) -> Self {
        kind as i16
    }
}

/// Channel entity
///
/// Belongs to exactly one guild; its id doubles as its room id on the gateway
/// (via `RoomKey::Channel`). A DM channel's membership is exactly its two
/// participants and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// Create a new channel of the given kind
    #[must_use]
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String, kind: ChannelKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            guild_id,
            name,
            kind,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a public channel
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self.kind, ChannelKind::Public)
    }

    /// Check if this is a DM channel
    #[inline]
    #[must_use]
    pub fn is_dm(&self) -> bool {
        matches!(self.kind, ChannelKind::Dm)
    }

    /// Check if access requires an allow-list row (private or DM)
    #[inline]
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.is_public()
    }
}
