//! Outbound server events
//!
//! Every message the gateway pushes to a client is a [`ServerEvent`]: a named
//! event (`t`) with a JSON payload (`d`). Event names are fixed strings the
//! clients dispatch on; they live in the [`event`] module so callers never
//! spell them inline.

use parley_core::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound event names
pub mod event {
    pub const ADD_CHANNEL: &str = "add_channel";
    pub const EDIT_CHANNEL: &str = "edit_channel";
    pub const DELETE_CHANNEL: &str = "delete_channel";
    pub const ADD_MEMBER: &str = "add_member";
    pub const REMOVE_MEMBER: &str = "remove_member";
    pub const NEW_MESSAGE: &str = "new_message";
    pub const EDIT_MESSAGE: &str = "edit_message";
    pub const DELETE_MESSAGE: &str = "delete_message";
    pub const TOGGLE_ONLINE: &str = "toggle_online";
    pub const TOGGLE_OFFLINE: &str = "toggle_offline";
    pub const ADD_TO_TYPING: &str = "addToTyping";
    pub const REMOVE_FROM_TYPING: &str = "removeFromTyping";
    pub const PUSH_TO_TOP: &str = "push_to_top";
    pub const JOIN_VOICE: &str = "joinVoice";
    pub const LEAVE_VOICE: &str = "leaveVoice";
    pub const VOICE_SIGNAL: &str = "voice-signal";
    pub const HELLO: &str = "hello";
    pub const HEARTBEAT_ACK: &str = "heartbeat_ack";
}

/// Outbound event envelope
///
/// Wire format: `{"t": "<event name>", "d": <payload>}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerEvent {
    /// Event name
    pub t: String,

    /// Event payload
    pub d: Value,
}

impl ServerEvent {
    /// Create an event from a name and an already serialized payload
    #[must_use]
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            t: name.into(),
            d: data,
        }
    }

    /// Create an event, serializing the payload
    ///
    /// Falls back to a null payload if serialization fails, which cannot
    /// happen for the payload types used in this crate.
    #[must_use]
    pub fn from_payload<T: Serialize>(name: impl Into<String>, payload: &T) -> Self {
        Self::new(name, serde_json::to_value(payload).unwrap_or(Value::Null))
    }

    /// Hello event sent immediately after the connection is established
    #[must_use]
    pub fn hello(heartbeat_interval_ms: u64) -> Self {
        Self::from_payload(
            event::HELLO,
            &HelloPayload {
                heartbeat_interval: heartbeat_interval_ms,
            },
        )
    }

    /// Reply to a client heartbeat
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::new(event::HEARTBEAT_ACK, Value::Null)
    }

    /// Typing started; payload is the typist's username
    #[must_use]
    pub fn add_to_typing(username: &str) -> Self {
        Self::new(event::ADD_TO_TYPING, Value::String(username.to_string()))
    }

    /// Typing stopped; payload is the typist's username
    #[must_use]
    pub fn remove_from_typing(username: &str) -> Self {
        Self::new(
            event::REMOVE_FROM_TYPING,
            Value::String(username.to_string()),
        )
    }

    /// User came online; payload is the user id
    #[must_use]
    pub fn toggle_online(user_id: Snowflake) -> Self {
        Self::new(event::TOGGLE_ONLINE, Value::String(user_id.to_string()))
    }

    /// User went offline; payload is the user id
    #[must_use]
    pub fn toggle_offline(user_id: Snowflake) -> Self {
        Self::new(event::TOGGLE_OFFLINE, Value::String(user_id.to_string()))
    }

    /// Voice roster changed because a user joined
    #[must_use]
    pub fn join_voice(payload: &VoiceRosterPayload) -> Self {
        Self::from_payload(event::JOIN_VOICE, payload)
    }

    /// Voice roster changed because a user left
    #[must_use]
    pub fn leave_voice(payload: &VoiceRosterPayload) -> Self {
        Self::from_payload(event::LEAVE_VOICE, payload)
    }

    /// Targeted WebRTC signaling payload, forwarded verbatim
    #[must_use]
    pub fn voice_signal(payload: Value) -> Self {
        Self::new(event::VOICE_SIGNAL, payload)
    }

    /// Serialize to JSON for the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload of the `hello` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelloPayload {
    /// Interval in milliseconds at which clients should send heartbeats
    pub heartbeat_interval: u64,
}

/// Payload of the `joinVoice` and `leaveVoice` events
///
/// `clients` is the full roster after the change, so receivers reconcile
/// their peer connections against it rather than applying a delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRosterPayload {
    /// Complete voice roster for the guild after the change
    pub clients: Vec<Snowflake>,

    /// The user who joined or left
    pub user_id: Snowflake,
}
