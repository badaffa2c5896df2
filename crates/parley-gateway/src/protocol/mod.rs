//! Wire protocol
//!
//! Defines inbound client frames and outbound server events.

mod events;
mod frames;

pub use events::{event, HelloPayload, ServerEvent, VoiceRosterPayload};
pub use frames::{ClientFrame, FrameError};
