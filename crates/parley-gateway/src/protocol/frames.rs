//! Inbound client frames
//!
//! Every message a client may send is a variant of [`ClientFrame`], a tagged
//! union validated at the boundary. Frames that fail to parse are dropped by
//! the caller; they never reach a handler.

use parley_core::{RoomKey, Snowflake};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed inbound frame
///
/// Wire format: `{"op": "<name>", "d": {...}}`. Variants without data omit
/// the `d` field entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join a channel room (authorization checked against the directory)
    JoinChannel { channel_id: Snowflake },

    /// Join a guild room
    JoinGuild { guild_id: Snowflake },

    /// Leave a previously joined room (always permitted)
    LeaveRoom { room: RoomKey },

    /// Announce typing in a room the connection has joined
    StartTyping { room: RoomKey },

    /// Retract a typing announcement
    StopTyping { room: RoomKey },

    /// Mark the user online and fan out to their guilds
    ToggleOnline,

    /// Mark the user offline and fan out to their guilds
    ToggleOffline,

    /// Enter the guild's voice roster
    JoinVoice { guild_id: Snowflake },

    /// Leave the guild's voice roster
    LeaveVoice { guild_id: Snowflake },

    /// Relay an opaque WebRTC negotiation payload to one peer
    VoiceSignal {
        guild_id: Snowflake,
        target_user_id: Snowflake,
        payload: Value,
    },

    /// Client keepalive; answered with `heartbeat_ack`
    Heartbeat,
}

impl ClientFrame {
    /// Parse a frame from a JSON text message
    pub fn from_json(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(FrameError::Decode)
    }

    /// Serialize to JSON (used by clients and tests)
    pub fn to_json(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(FrameError::Decode)
    }

    /// Frame name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinChannel { .. } => "join_channel",
            Self::JoinGuild { .. } => "join_guild",
            Self::LeaveRoom { .. } => "leave_room",
            Self::StartTyping { .. } => "start_typing",
            Self::StopTyping { .. } => "stop_typing",
            Self::ToggleOnline => "toggle_online",
            Self::ToggleOffline => "toggle_offline",
            Self::JoinVoice { .. } => "join_voice",
            Self::LeaveVoice { .. } => "leave_voice",
            Self::VoiceSignal { .. } => "voice_signal",
            Self::Heartbeat => "heartbeat",
        }
    }
}

/// Frame parsing errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),
}
